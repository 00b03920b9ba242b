//! Page/limit normalization and search term handling for list requests.

use std::collections::HashMap;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Normalized pagination. `limit` is always within 1..=MAX_LIMIT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Out-of-range or unparsable values fall back to defaults; limits above
    /// MAX_LIMIT are clamped.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if l >= 1 => l.min(MAX_LIMIT as i64) as u32,
            _ => DEFAULT_LIMIT,
        };
        Pagination { page, limit }
    }

    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let num = |k: &str| params.get(k).and_then(|v| v.trim().parse::<i64>().ok());
        Pagination::new(num("page"), num("limit"))
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let limit = self.limit as i64;
        (total + limit - 1) / limit
    }
}

/// Search term from `q`: trimmed, `None` when empty.
pub fn search_term(params: &HashMap<String, String>) -> Option<String> {
    params
        .get("q")
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}

/// ILIKE pattern matching `term` as a literal substring.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
