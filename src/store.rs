//! Thread-safe record set with pluggable matchers.

use parking_lot::Mutex;
use std::fs;
use std::path::Path;

use crate::matcher::{Matchers, Records};
use crate::{Error, Result};

/// The in-memory record set behind a single mutex.
///
/// Every public method takes the lock once for its whole duration and never
/// calls another locking method, so the lock is never re-entered.
///
/// # Examples
/// ```
/// use remotelist::store::RecordStore;
/// use remotelist::matcher::Matchers;
///
/// let store = RecordStore::new(Matchers::default());
/// store.load_str("# blocked hosts\nExample.com\n\n10.0.0.1\n");
///
/// assert!(store.has("example.com"));
/// assert_eq!(store.list(), vec!["10.0.0.1", "Example.com"]);
/// ```
pub struct RecordStore {
    records: Mutex<Records>,
    matchers: Matchers,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new(matchers: Matchers) -> Self {
        Self {
            records: Mutex::new(Records::default()),
            matchers,
        }
    }

    /// Load every line of the file at `path` through the line processor.
    ///
    /// Returns the number of lines accepted.
    pub fn load_file(&self, path: &Path) -> Result<usize> {
        let content = fs::read(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let accepted = self.load_str(&String::from_utf8_lossy(&content));
        log::info!("Loaded {} records from {:?}", self.len(), path);
        Ok(accepted)
    }

    /// Load every line of `content` through the line processor.
    ///
    /// Returns the number of lines accepted.
    pub fn load_str(&self, content: &str) -> usize {
        let mut records = self.records.lock();
        let mut accepted = 0;
        for line in content.lines() {
            if let Some(parsed) = (self.matchers.line_processor)(line) {
                insert(&mut *records, &parsed);
                accepted += 1;
            }
        }
        accepted
    }

    /// Whether the exact matcher finds `term`.
    pub fn has(&self, term: &str) -> bool {
        let records = self.records.lock();
        (self.matchers.has)(&*records, term)
    }

    /// Whether the prefix matcher finds `term`.
    pub fn has_prefix(&self, term: &str) -> bool {
        let records = self.records.lock();
        (self.matchers.has_prefix)(&*records, term)
    }

    /// Whether the suffix matcher finds `term`.
    pub fn has_suffix(&self, term: &str) -> bool {
        let records = self.records.lock();
        (self.matchers.has_suffix)(&*records, term)
    }

    /// All records the search matcher returns for `term`, sorted.
    pub fn search(&self, term: &str) -> Vec<String> {
        let mut res = {
            let records = self.records.lock();
            (self.matchers.search)(&*records, term)
        };
        // Custom matchers are not required to sort
        res.sort();
        res
    }

    /// Insert `value` with surrounding whitespace trimmed.
    ///
    /// Adding a value already present is a no-op.
    pub fn add(&self, value: &str) {
        let mut records = self.records.lock();
        insert(&mut *records, value);
    }

    /// All records, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut res: Vec<String> = self.records.lock().iter().cloned().collect();
        res.sort();
        res
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn matchers(&self) -> &Matchers {
        &self.matchers
    }
}

fn insert(records: &mut Records, value: &str) {
    let value = value.trim();
    if !records.contains(value) {
        records.insert(value.to_string());
    }
}
