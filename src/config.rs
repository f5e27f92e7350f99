//! File-based configuration for a remote list.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for a [`RemoteList`](crate::RemoteList).
///
/// Durations are given in whole seconds.
///
/// ```yaml
/// local_path: /var/cache/remotelist/blocklist.txt
/// url: https://example.com/blocklist.txt
/// max_age: 86400
/// timeout: 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Local cache file
    pub local_path: PathBuf,
    /// Remote URL of the list
    pub url: String,
    /// Maximum cache age before the list is downloaded again
    #[serde(with = "duration_secs")]
    pub max_age: Duration,
    /// Request timeout
    #[serde(default, with = "opt_duration_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// User agent sent with the download request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Gunzip the payload when it is gzip compressed
    #[serde(default)]
    pub decompress_gzip: bool,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        d.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

mod opt_duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(d: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        d.map(|d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

impl ListConfig {
    /// Create a config with the three required settings.
    pub fn new(local_path: impl Into<PathBuf>, url: impl Into<String>, max_age: Duration) -> Self {
        Self {
            local_path: local_path.into(),
            url: url.into(),
            max_age,
            timeout: None,
            user_agent: None,
            decompress_gzip: false,
        }
    }

    /// Load a config file. `.json` files are read as JSON, anything else
    /// as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.local_path.as_os_str().is_empty() {
            return Err(Error::Config("local_path is empty".to_string()));
        }
        if self.url.is_empty() {
            return Err(Error::Config("url is empty".to_string()));
        }
        let lower = self.url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(Error::Config(format!(
                "unsupported url scheme: {}",
                self.url
            )));
        }
        Ok(())
    }
}
