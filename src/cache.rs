//! Staleness-gated download of a remote list into a local cache file.
//!
//! The cache file is considered fresh while its modification time is less
//! than `max_age` in the past. A missing file is never fresh. When a refresh
//! is needed the list is downloaded, optionally gunzipped and filtered, and
//! then written atomically: a sibling temporary file is filled, given the
//! permissions of the file it replaces (or `0o644` for a new file), synced
//! and renamed over the target.
//!
//! When the cache path is a symlink, the file it points to is replaced and
//! the link itself is left in place.

use flate2::read::GzDecoder;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;

use crate::matcher::Matchers;
use crate::transport::Transport;
use crate::{Error, Result};

/// Permission bits for a newly created cache file.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Freshness of the local cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No cache file exists
    Missing,
    /// Cache file is younger than the maximum age
    Fresh { age: Duration },
    /// Cache file is at least as old as the maximum age
    Stale { age: Duration },
}

impl Freshness {
    /// Whether a download is required.
    pub fn needs_refresh(&self) -> bool {
        !matches!(self, Freshness::Fresh { .. })
    }

    /// Classify a cache file last modified at `modified`.
    ///
    /// A modification time in the future counts as age zero.
    pub fn classify(modified: SystemTime, now: SystemTime, max_age: Duration) -> Self {
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age < max_age {
            Freshness::Fresh { age }
        } else {
            Freshness::Stale { age }
        }
    }
}

/// What [`ListCache::refresh_if_stale`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cache was fresh, nothing was fetched
    Fresh,
    /// A new copy was downloaded and written
    Downloaded { bytes: usize },
}

/// A local cache file backed by a remote URL.
#[derive(Debug, Clone)]
pub struct ListCache {
    /// Local cache file
    path: PathBuf,
    /// Remote URL the list is downloaded from
    url: String,
    /// Maximum age before the cache is downloaded again
    max_age: Duration,
    /// Gunzip payloads that start with the gzip magic bytes
    decompress_gzip: bool,
}

impl ListCache {
    pub fn new(path: impl AsRef<Path>, url: &str, max_age: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            url: url.to_string(),
            max_age,
            decompress_gzip: false,
        }
    }

    /// Decompress gzip payloads (e.g. `.txt.gz` mirrors) before filtering.
    pub fn with_gzip(mut self, enabled: bool) -> Self {
        self.decompress_gzip = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Freshness of the cache file right now.
    pub fn freshness(&self) -> Freshness {
        match fs::metadata(&self.path) {
            Ok(meta) => self.freshness_of(&meta),
            Err(_) => Freshness::Missing,
        }
    }

    fn freshness_of(&self, meta: &fs::Metadata) -> Freshness {
        match meta.modified() {
            Ok(modified) => Freshness::classify(modified, SystemTime::now(), self.max_age),
            // No mtime support: the age is unknown, so refresh
            Err(_) => Freshness::Stale { age: Duration::MAX },
        }
    }

    /// Download the list if the cache file is missing or stale.
    ///
    /// On any error the cache file is left as it was.
    pub fn refresh_if_stale(
        &self,
        transport: &dyn Transport,
        matchers: &Matchers,
    ) -> Result<RefreshOutcome> {
        let existing = fs::metadata(&self.path).ok();
        let freshness = match &existing {
            Some(meta) => self.freshness_of(meta),
            None => Freshness::Missing,
        };

        if !freshness.needs_refresh() {
            log::debug!("Local list {:?} is fresh ({:?})", self.path, freshness);
            return Ok(RefreshOutcome::Fresh);
        }
        log::debug!(
            "Local list {:?} needs refresh ({:?}), downloading {}",
            self.path,
            freshness,
            self.url
        );

        let response = transport.get(&self.url)?;
        if !response.is_success() {
            return Err(Error::Status(response.status));
        }

        let raw_len = response.body.len();
        let data = if self.decompress_gzip && is_gzip(&response.body) {
            gunzip(&response.body)?
        } else {
            response.body
        };
        let data = matchers.filter_payload(data);

        self.persist(&data, existing.map(|meta| meta.permissions()))?;

        if data.len() != raw_len {
            log::info!(
                "Downloaded and saved list {:?}: {} bytes (downloaded: {} bytes)",
                self.path,
                data.len(),
                raw_len
            );
        } else {
            log::info!("Downloaded and saved list {:?}: {} bytes", self.path, data.len());
        }

        Ok(RefreshOutcome::Downloaded { bytes: data.len() })
    }

    /// Atomically replace the cache file with `data`.
    fn persist(&self, data: &[u8], permissions: Option<fs::Permissions>) -> Result<()> {
        let persist_err = |source: std::io::Error| Error::Persist {
            path: self.path.clone(),
            source,
        };

        // Write through an existing symlink instead of replacing it
        let target = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(persist_err)?;

        // Dropping the temp file on an early return removes it
        let mut temp_file = NamedTempFile::new_in(dir).map_err(persist_err)?;
        temp_file.write_all(data).map_err(persist_err)?;
        if let Some(permissions) = permissions.or_else(default_permissions) {
            temp_file
                .as_file()
                .set_permissions(permissions)
                .map_err(persist_err)?;
        }
        temp_file.as_file().sync_all().map_err(persist_err)?;

        temp_file.persist(&target).map_err(|e| {
            if let Err(cleanup) = e.file.close() {
                log::warn!("Failed to remove temporary list file: {}", cleanup);
            }
            persist_err(e.error)
        })?;

        Ok(())
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(DEFAULT_FILE_MODE))
}

// Only the read-only flag exists here and a new temp file is already writable
#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Check if data is gzip compressed.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Fetch(format!("gzip decompression failed: {}", e)))?;
    Ok(out)
}
