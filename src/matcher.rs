//! Pluggable matching and content-processing strategies.
//!
//! A [`Matchers`] value bundles the six strategies a list is built with:
//!
//! - exact, prefix and suffix predicates (`has`, `has_prefix`, `has_suffix`)
//! - a substring `search`
//! - a payload filter run over downloaded bytes before they are cached
//! - a line processor run over every cached line on load
//!
//! Every strategy defaults to one of the plain functions in this module,
//! so the defaults carry no shared state and are safe to call from any
//! thread.

use ahash::AHashSet;
use std::sync::Arc;

/// The in-memory record set.
pub type Records = AHashSet<String>;

/// Predicate over the record set (exact, prefix or suffix match).
pub type HasFn = Arc<dyn Fn(&Records, &str) -> bool + Send + Sync>;

/// Search over the record set returning every match.
pub type SearchFn = Arc<dyn Fn(&Records, &str) -> Vec<String> + Send + Sync>;

/// Transform applied to the whole downloaded payload before it is written.
pub type PayloadFilterFn = Arc<dyn Fn(Vec<u8>) -> Vec<u8> + Send + Sync>;

/// Transform applied to each cached line; `None` drops the line.
pub type LineFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Case-insensitive exact match against any record.
pub fn default_has(records: &Records, term: &str) -> bool {
    let term = term.to_lowercase();
    records.iter().any(|rec| rec.to_lowercase() == term)
}

/// Case-insensitive check that any record starts with `term`.
pub fn default_has_prefix(records: &Records, term: &str) -> bool {
    let term = term.to_lowercase();
    records.iter().any(|rec| rec.to_lowercase().starts_with(&term))
}

/// Case-insensitive check that any record ends with `term`.
pub fn default_has_suffix(records: &Records, term: &str) -> bool {
    let term = term.to_lowercase();
    records.iter().any(|rec| rec.to_lowercase().ends_with(&term))
}

/// Case-insensitive substring search, sorted ascending.
pub fn default_search(records: &Records, term: &str) -> Vec<String> {
    let term = term.to_lowercase();
    let mut res: Vec<String> = records
        .iter()
        .filter(|rec| rec.to_lowercase().contains(&term))
        .cloned()
        .collect();
    res.sort();
    res
}

/// Drops empty lines and lines starting with `#` or `//`.
///
/// Everything else passes through unchanged; the store trims on insert, so a
/// whitespace-only line becomes an empty record.
pub fn default_line_processor(line: &str) -> Option<String> {
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return None;
    }
    Some(line.to_string())
}

/// The strategies a list is configured with.
#[derive(Clone)]
pub struct Matchers {
    /// Exact match used by `has`
    pub has: HasFn,
    /// Prefix match used by `has_prefix`
    pub has_prefix: HasFn,
    /// Suffix match used by `has_suffix`
    pub has_suffix: HasFn,
    /// Search used by `search`
    pub search: SearchFn,
    /// Payload transform before caching; `None` writes it as downloaded
    pub payload_filter: Option<PayloadFilterFn>,
    /// Per-line transform and filter applied on load
    pub line_processor: LineFn,
}

impl Default for Matchers {
    fn default() -> Self {
        Self {
            has: Arc::new(default_has),
            has_prefix: Arc::new(default_has_prefix),
            has_suffix: Arc::new(default_has_suffix),
            search: Arc::new(default_search),
            payload_filter: None,
            line_processor: Arc::new(default_line_processor),
        }
    }
}

impl Matchers {
    /// Run the payload filter, or pass the bytes through if none is set.
    pub fn filter_payload(&self, payload: Vec<u8>) -> Vec<u8> {
        match &self.payload_filter {
            Some(filter) => filter(payload),
            None => payload,
        }
    }
}

impl std::fmt::Debug for Matchers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matchers")
            .field("payload_filter", &self.payload_filter.is_some())
            .finish_non_exhaustive()
    }
}
