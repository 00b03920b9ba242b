//! Declarative field rules compiled into record hooks.

use super::Hook;
use crate::config::ValidationRule;
use crate::error::ValidationError;
use crate::record::{Record, Scalar};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

struct CompiledRule {
    field: String,
    rule: ValidationRule,
    pattern: Option<Regex>,
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("static regex")
    })
}

/// Returns (before_create, before_update). Create enforces `required` for every
/// rule; update only checks the fields the caller sent.
pub(super) fn compile(rules: &HashMap<String, ValidationRule>) -> Result<(Hook<Record>, Hook<Record>), String> {
    let mut compiled = Vec::with_capacity(rules.len());
    for (field, rule) in rules {
        let pattern = match &rule.pattern {
            Some(p) => Some(Regex::new(p).map_err(|_| format!("invalid pattern for {}", field))?),
            None => None,
        };
        compiled.push(CompiledRule {
            field: field.clone(),
            rule: rule.clone(),
            pattern,
        });
    }
    compiled.sort_by(|a, b| a.field.cmp(&b.field));
    let compiled = Arc::new(compiled);

    let for_create = compiled.clone();
    let create: Hook<Record> = Arc::new(move |record: &Record| {
        for c in for_create.iter() {
            match record.get(&c.field) {
                Some(v) => check_present(c, v)?,
                None if c.rule.required == Some(true) => {
                    return Err(ValidationError::new(format!("{} is required", c.field)));
                }
                None => {}
            }
        }
        Ok(())
    });

    let update: Hook<Record> = Arc::new(move |record: &Record| {
        for c in compiled.iter() {
            if let Some(v) = record.get(&c.field) {
                check_present(c, v)?;
            }
        }
        Ok(())
    });

    Ok((create, update))
}

fn is_blank(v: &Scalar) -> bool {
    match v {
        Scalar::Null => true,
        Scalar::Text(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_present(c: &CompiledRule, v: &Scalar) -> Result<(), ValidationError> {
    if c.rule.required == Some(true) && is_blank(v) {
        return Err(ValidationError::new(format!("{} is required", c.field)));
    }
    if v.is_null() {
        return Ok(());
    }
    validate_field(c, v)
}

fn validate_field(c: &CompiledRule, v: &Scalar) -> Result<(), ValidationError> {
    let col = c.field.as_str();
    let rule = &c.rule;
    if let Some(format) = &rule.format {
        validate_format(col, v, format)?;
    }
    if let Some(s) = v.as_str() {
        let len = s.trim().chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                return Err(ValidationError::new(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                return Err(ValidationError::new(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
        if let Some(re) = &c.pattern {
            if !re.is_match(s) {
                return Err(ValidationError::new(format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(allowed) = &rule.allowed {
        let json = v.to_json();
        if !allowed.iter().any(|a| value_eq(&json, a)) {
            return Err(ValidationError::new(format!(
                "{} must be one of: {:?}",
                col,
                allowed.iter().take(5).collect::<Vec<_>>()
            )));
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                return Err(ValidationError::new(format!("{} must be at least {}", col, min)));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                return Err(ValidationError::new(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

fn value_eq(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    use serde_json::Value;
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(col: &str, v: &Scalar, format: &str) -> Result<(), ValidationError> {
    let Some(s) = v.as_str() else { return Ok(()) };
    match format.to_lowercase().as_str() {
        "email" => {
            if !email_re().is_match(s) {
                return Err(ValidationError::new(format!("{} must be a valid email", col)));
            }
        }
        "date" => {
            if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                return Err(ValidationError::new(format!("{} must be YYYY-MM-DD", col)));
            }
        }
        _ => {}
    }
    Ok(())
}
