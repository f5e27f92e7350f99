//! The public remote list: fetch once, load once, then query.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Freshness, ListCache, RefreshOutcome};
use crate::config::ListConfig;
use crate::matcher::{HasFn, LineFn, Matchers, PayloadFilterFn, Records, SearchFn};
use crate::store::RecordStore;
use crate::transport::{HttpTransport, Transport};
use crate::Result;

/// A locally cached copy of a remote line-delimited list.
///
/// Construction downloads the list if the cache file is missing or older
/// than `max_age`, then loads the cache file into memory. A constructed
/// list only ever answers queries; the cache file is not touched again and
/// records added with [`add`](Self::add) stay in memory.
///
/// `RemoteList` is `Send + Sync`; share it with an `Arc`.
///
/// # Example
///
/// ```ignore
/// use remotelist::RemoteList;
/// use std::time::Duration;
///
/// let list = RemoteList::new(
///     "/var/cache/remotelist/ipsum.txt",
///     "https://raw.githubusercontent.com/stamparm/ipsum/master/levels/3.txt",
///     Duration::from_secs(24 * 3600),
/// )?;
///
/// if list.has("203.0.113.7") {
///     println!("blocked");
/// }
/// ```
pub struct RemoteList {
    cache: ListCache,
    store: RecordStore,
    outcome: RefreshOutcome,
}

impl RemoteList {
    /// Create a list with the default matchers and HTTP transport.
    pub fn new(local: impl AsRef<Path>, url: &str, max_age: Duration) -> Result<Self> {
        Self::builder(local, url, max_age).build()
    }

    /// Start configuring a list.
    pub fn builder(local: impl AsRef<Path>, url: &str, max_age: Duration) -> RemoteListBuilder {
        RemoteListBuilder::new(local, url, max_age)
    }

    /// Create a list from a loaded [`ListConfig`].
    pub fn from_config(config: &ListConfig) -> Result<Self> {
        Self::builder_from_config(config)?.build()
    }

    /// Start configuring a list from a [`ListConfig`], e.g. to add matchers.
    pub fn builder_from_config(config: &ListConfig) -> Result<RemoteListBuilder> {
        config.validate()?;

        let mut transport = HttpTransport::new();
        if let Some(timeout) = config.timeout {
            transport = transport.with_timeout(timeout);
        }
        if let Some(ref user_agent) = config.user_agent {
            transport = transport.with_user_agent(user_agent);
        }

        Ok(Self::builder(&config.local_path, &config.url, config.max_age)
            .transport(transport)
            .decompress_gzip(config.decompress_gzip))
    }

    /// Whether the exact matcher finds `term`.
    pub fn has(&self, term: &str) -> bool {
        self.store.has(term)
    }

    /// Whether the prefix matcher finds `term`.
    pub fn has_prefix(&self, term: &str) -> bool {
        self.store.has_prefix(term)
    }

    /// Whether the suffix matcher finds `term`.
    pub fn has_suffix(&self, term: &str) -> bool {
        self.store.has_suffix(term)
    }

    /// All matching records, sorted.
    pub fn search(&self, term: &str) -> Vec<String> {
        self.store.search(term)
    }

    /// Add a record in memory. The cache file is not modified.
    pub fn add(&self, value: &str) {
        self.store.add(value)
    }

    /// All records, sorted.
    pub fn list(&self) -> Vec<String> {
        self.store.list()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Whether construction downloaded a new copy.
    pub fn refresh_outcome(&self) -> RefreshOutcome {
        self.outcome
    }

    /// Freshness of the cache file now; a later construction would
    /// download when this reports a refresh is needed.
    pub fn freshness(&self) -> Freshness {
        self.cache.freshness()
    }

    pub fn local_path(&self) -> &Path {
        self.cache.path()
    }

    pub fn url(&self) -> &str {
        self.cache.url()
    }

    pub fn max_age(&self) -> Duration {
        self.cache.max_age()
    }
}

impl std::fmt::Debug for RemoteList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteList")
            .field("cache", &self.cache)
            .field("records", &self.store.len())
            .field("outcome", &self.outcome)
            .finish()
    }
}

/// Builder for [`RemoteList`]. Any strategy left unset uses its default
/// from [`matcher`](crate::matcher).
pub struct RemoteListBuilder {
    cache: ListCache,
    matchers: Matchers,
    transport: Box<dyn Transport>,
}

impl RemoteListBuilder {
    fn new(local: impl AsRef<Path>, url: &str, max_age: Duration) -> Self {
        Self {
            cache: ListCache::new(local, url, max_age),
            matchers: Matchers::default(),
            transport: Box::new(HttpTransport::new()),
        }
    }

    /// Exact-match strategy used by `has`.
    pub fn has_matcher<F>(mut self, f: F) -> Self
    where
        F: Fn(&Records, &str) -> bool + Send + Sync + 'static,
    {
        self.matchers.has = Arc::new(f) as HasFn;
        self
    }

    /// Prefix strategy used by `has_prefix`.
    pub fn prefix_matcher<F>(mut self, f: F) -> Self
    where
        F: Fn(&Records, &str) -> bool + Send + Sync + 'static,
    {
        self.matchers.has_prefix = Arc::new(f) as HasFn;
        self
    }

    /// Suffix strategy used by `has_suffix`.
    pub fn suffix_matcher<F>(mut self, f: F) -> Self
    where
        F: Fn(&Records, &str) -> bool + Send + Sync + 'static,
    {
        self.matchers.has_suffix = Arc::new(f) as HasFn;
        self
    }

    /// Search strategy used by `search`.
    pub fn search_matcher<F>(mut self, f: F) -> Self
    where
        F: Fn(&Records, &str) -> Vec<String> + Send + Sync + 'static,
    {
        self.matchers.search = Arc::new(f) as SearchFn;
        self
    }

    /// Transform applied to the downloaded payload before it is cached.
    pub fn payload_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<u8>) -> Vec<u8> + Send + Sync + 'static,
    {
        self.matchers.payload_filter = Some(Arc::new(f) as PayloadFilterFn);
        self
    }

    /// Transform applied to each cached line on load; `None` drops it.
    pub fn line_processor<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.matchers.line_processor = Arc::new(f) as LineFn;
        self
    }

    /// Replace the whole strategy set.
    pub fn matchers(mut self, matchers: Matchers) -> Self {
        self.matchers = matchers;
        self
    }

    /// Transport used for the download.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }

    /// Gunzip gzip-compressed payloads before filtering.
    pub fn decompress_gzip(mut self, enabled: bool) -> Self {
        self.cache = self.cache.with_gzip(enabled);
        self
    }

    /// Refresh the cache file if needed, then load it.
    pub fn build(self) -> Result<RemoteList> {
        let outcome = self
            .cache
            .refresh_if_stale(self.transport.as_ref(), &self.matchers)?;

        let store = RecordStore::new(self.matchers);
        store.load_file(self.cache.path())?;

        Ok(RemoteList {
            cache: self.cache,
            store,
            outcome,
        })
    }
}
