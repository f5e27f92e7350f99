//! remotelist - a locally cached, searchable copy of a remote text list.
//!
//! This crate keeps an in-memory copy of a line-delimited list (an IP
//! blocklist, a domain list, ...) that is downloaded from a URL, cached on
//! disk and only downloaded again once the cached copy is older than a
//! configured maximum age.
//!
//! # Features
//!
//! - **Staleness-gated downloads**: the cache file's modification time decides
//!   whether a download happens
//! - **Atomic cache writes**: temp file + rename, existing permissions kept
//! - **Pluggable matchers**: exact, prefix, suffix and substring strategies,
//!   case-insensitive by default
//! - **Line processing**: comments and blank lines are dropped on load, or
//!   supply your own parser
//! - **Thread-safe**: all queries go through one mutex
//!
//! # Quick Start
//!
//! ```ignore
//! use remotelist::RemoteList;
//! use std::time::Duration;
//!
//! let list = RemoteList::builder(
//!     "/var/cache/remotelist/hosts.txt",
//!     "https://example.com/hosts.txt",
//!     Duration::from_secs(86400),
//! )
//! .line_processor(|line| {
//!     // "0.0.0.0 ads.example" -> "ads.example"
//!     line.strip_prefix("0.0.0.0 ").map(|d| d.to_string())
//! })
//! .build()?;
//!
//! assert!(list.has("ads.example"));
//! let matches = list.search("ads");
//! ```
//!
//! # Construction
//!
//! Construction is the only time the cache file or the network is touched:
//!
//! 1. If the cache file is missing or at least `max_age` old, download the
//!    list, run the payload filter and write the cache file.
//! 2. Read the cache file and run every line through the line processor.
//!
//! Either step failing makes construction fail. Retrying is left to the
//! caller.

mod error;

pub mod cache;
pub mod config;
pub mod list;
pub mod matcher;
pub mod store;
pub mod transport;

// Re-export core types
pub use error::{Error, Result};
pub use list::{RemoteList, RemoteListBuilder};

pub use cache::{Freshness, ListCache, RefreshOutcome};
pub use config::ListConfig;
pub use matcher::{Matchers, Records};
pub use store::RecordStore;
pub use transport::{HttpTransport, Response, Transport};
