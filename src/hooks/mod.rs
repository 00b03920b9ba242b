//! Pre-mutation hooks: validation and authorization predicates that run before
//! a mutating statement is built. Hooks never touch the store.

mod rules;

use crate::config::ValidationRule;
use crate::error::ValidationError;
use crate::record::{EntityId, Record};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type Hook<T> = Arc<dyn Fn(&T) -> Result<(), ValidationError> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookPoint {
    BeforeCreate,
    BeforeUpdate,
    BeforeDelete,
}

#[derive(Clone, Copy, Debug)]
pub enum HookPayload<'a> {
    Record(&'a Record),
    Id(&'a EntityId),
}

/// Optional callbacks for one entity. A missing hook is a no-op success.
#[derive(Clone, Default)]
pub struct HookSet {
    before_create: Option<Hook<Record>>,
    before_update: Option<Hook<Record>>,
    before_delete: Option<Hook<EntityId>>,
}

impl HookSet {
    pub fn new() -> Self {
        HookSet::default()
    }

    pub fn before_create<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.before_create = Some(Arc::new(f));
        self
    }

    pub fn before_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.before_update = Some(Arc::new(f));
        self
    }

    pub fn before_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&EntityId) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.before_delete = Some(Arc::new(f));
        self
    }

    /// Compile declarative field rules into create/update hooks.
    pub fn from_rules(rules: &HashMap<String, ValidationRule>) -> Result<Self, String> {
        if rules.is_empty() {
            return Ok(HookSet::new());
        }
        let (create, update) = rules::compile(rules)?;
        Ok(HookSet {
            before_create: Some(create),
            before_update: Some(update),
            before_delete: None,
        })
    }

    /// Run `self` then `next` at every hook point; the first failure wins.
    pub fn chain(self, next: HookSet) -> HookSet {
        HookSet {
            before_create: chain(self.before_create, next.before_create),
            before_update: chain(self.before_update, next.before_update),
            before_delete: chain(self.before_delete, next.before_delete),
        }
    }

    pub fn run_before(&self, point: HookPoint, payload: HookPayload<'_>) -> Result<(), ValidationError> {
        match (point, payload) {
            (HookPoint::BeforeCreate, HookPayload::Record(r)) => run(&self.before_create, r),
            (HookPoint::BeforeUpdate, HookPayload::Record(r)) => run(&self.before_update, r),
            (HookPoint::BeforeDelete, HookPayload::Id(id)) => run(&self.before_delete, id),
            _ => Err(ValidationError::new(format!("payload does not match {:?}", point))),
        }
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("before_create", &self.before_create.is_some())
            .field("before_update", &self.before_update.is_some())
            .field("before_delete", &self.before_delete.is_some())
            .finish()
    }
}

fn run<T>(hook: &Option<Hook<T>>, payload: &T) -> Result<(), ValidationError> {
    match hook {
        Some(h) => h(payload),
        None => Ok(()),
    }
}

fn chain<T: 'static>(first: Option<Hook<T>>, second: Option<Hook<T>>) -> Option<Hook<T>> {
    match (first, second) {
        (Some(a), Some(b)) => Some(Arc::new(move |p: &T| {
            a(p)?;
            b(p)
        })),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Scalar;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn missing_hooks_succeed() {
        let hooks = HookSet::new();
        let r = Record::new();
        assert!(hooks.run_before(HookPoint::BeforeCreate, HookPayload::Record(&r)).is_ok());
        assert!(hooks.run_before(HookPoint::BeforeUpdate, HookPayload::Record(&r)).is_ok());
        assert!(hooks
            .run_before(HookPoint::BeforeDelete, HookPayload::Id(&EntityId::Int(1)))
            .is_ok());
    }

    #[test]
    fn hook_sees_payload() {
        let hooks = HookSet::new().before_create(|r| match r.get("kode") {
            Some(Scalar::Text(k)) if k.starts_with('C') => Ok(()),
            _ => Err(ValidationError::new("kode must start with C")),
        });
        let ok = Record::new().with("kode", Scalar::Text("C1".into()));
        let bad = Record::new().with("kode", Scalar::Text("X1".into()));
        assert!(hooks.run_before(HookPoint::BeforeCreate, HookPayload::Record(&ok)).is_ok());
        assert_eq!(
            hooks
                .run_before(HookPoint::BeforeCreate, HookPayload::Record(&bad))
                .unwrap_err()
                .0,
            "kode must start with C"
        );
    }

    #[test]
    fn chain_stops_at_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let first = HookSet::new().before_delete(|_| Err(ValidationError::new("first")));
        let second = HookSet::new().before_delete(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let hooks = first.chain(second);
        let err = hooks
            .run_before(HookPoint::BeforeDelete, HookPayload::Id(&EntityId::Int(5)))
            .unwrap_err();
        assert_eq!(err.0, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn mismatched_payload_is_rejected() {
        let hooks = HookSet::new();
        assert!(hooks
            .run_before(HookPoint::BeforeDelete, HookPayload::Record(&Record::new()))
            .is_err());
    }
}
