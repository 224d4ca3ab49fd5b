//! Tracker configuration.
//!
//! All tunables of the search engine live in [`TrackerConfig`]. Values can be
//! set programmatically through [`TrackerConfigBuilder`] or loaded from a TOML
//! file, where durations are written as integer milliseconds:
//!
//! ```toml
//! page_size = 200
//! refresh_interval = 10000
//! batch_delay = 600
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default ladder host
pub const DEFAULT_BASE_URL: &str = "https://www.pathofexile.com";

/// Configuration for the ladder tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Scheme and host of the ladder service, without trailing slash
    pub base_url: String,
    /// Realm query parameter
    pub realm: String,
    /// Entries requested per page
    pub page_size: u32,
    /// Wait between the end of one cycle and the start of the next
    #[serde(with = "duration_ms")]
    pub refresh_interval: Duration,
    /// Pages fetched concurrently in one full-scan batch
    pub concurrent_batch_size: u32,
    /// Pause enforced between full-scan batches
    #[serde(with = "duration_ms")]
    pub batch_delay: Duration,
    /// Retries allowed for a rate-limited request
    pub max_retries: u32,
    /// Backoff unit when the server gives no retry hint
    #[serde(with = "duration_ms")]
    pub retry_base_delay: Duration,
    /// Added on top of a server-provided retry hint
    #[serde(with = "duration_ms")]
    pub retry_hint_padding: Duration,
    /// Entry count assumed when the service omits `total`
    pub fallback_total: u32,
    /// Per-request timeout
    #[serde(with = "duration_ms")]
    pub request_timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            realm: "pc".to_string(),
            page_size: 200,
            refresh_interval: Duration::from_secs(10),
            concurrent_batch_size: 4,
            batch_delay: Duration::from_millis(600),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(2),
            retry_hint_padding: Duration::from_millis(500),
            fallback_total: 15000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TrackerConfig {
    /// Create a new configuration builder
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::default()
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: TrackerConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        debug!("Loaded tracker config from {}", path.display());
        Ok(config)
    }

    /// Reject values the search engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be greater than zero".into()));
        }
        if self.concurrent_batch_size == 0 {
            return Err(Error::Config(
                "concurrent_batch_size must be greater than zero".into(),
            ));
        }
        if self.refresh_interval.is_zero() {
            return Err(Error::Config(
                "refresh_interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Offset span covered by one full-scan batch
    pub fn batch_span(&self) -> u32 {
        self.page_size
            .max(1)
            .saturating_mul(self.concurrent_batch_size.max(1))
    }
}

/// Builder for TrackerConfig
#[derive(Debug, Clone, Default)]
pub struct TrackerConfigBuilder {
    base_url: Option<String>,
    realm: Option<String>,
    page_size: Option<u32>,
    refresh_interval: Option<Duration>,
    concurrent_batch_size: Option<u32>,
    batch_delay: Option<Duration>,
    max_retries: Option<u32>,
    retry_base_delay: Option<Duration>,
    fallback_total: Option<u32>,
}

impl TrackerConfigBuilder {
    pub fn base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn realm<S: Into<String>>(mut self, realm: S) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn concurrent_batch_size(mut self, size: u32) -> Self {
        self.concurrent_batch_size = Some(size);
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    pub fn fallback_total(mut self, total: u32) -> Self {
        self.fallback_total = Some(total);
        self
    }

    /// Build the configuration
    pub fn build(self) -> TrackerConfig {
        let default = TrackerConfig::default();
        TrackerConfig {
            base_url: self.base_url.unwrap_or(default.base_url),
            realm: self.realm.unwrap_or(default.realm),
            page_size: self.page_size.unwrap_or(default.page_size),
            refresh_interval: self.refresh_interval.unwrap_or(default.refresh_interval),
            concurrent_batch_size: self
                .concurrent_batch_size
                .unwrap_or(default.concurrent_batch_size),
            batch_delay: self.batch_delay.unwrap_or(default.batch_delay),
            max_retries: self.max_retries.unwrap_or(default.max_retries),
            retry_base_delay: self.retry_base_delay.unwrap_or(default.retry_base_delay),
            fallback_total: self.fallback_total.unwrap_or(default.fallback_total),
            ..default
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
