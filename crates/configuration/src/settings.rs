use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its `Default`, so an empty file (or no file at
/// all) yields a working configuration pointed at a local backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub refresh: RefreshSettings,
    pub pagination: PaginationSettings,
    pub logging: LoggingSettings,
}

/// Where the backend lives and how long a single request may take.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/api/v1`.
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Staleness and retention windows of the query cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Age after which cached data is refetched on the next read.
    pub stale_time_secs: u64,
    /// How long an unused entry is retained before garbage collection.
    pub cache_time_secs: u64,
}

/// Per-query polling intervals used in watch mode, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    pub health_secs: u64,
    pub opportunity_stats_secs: u64,
    pub analytics_secs: u64,
    pub exchange_health_secs: u64,
    pub exchange_health_page_secs: u64,
    pub opportunities_secs: u64,
    pub tokens_secs: u64,
    pub exchanges_secs: u64,
    /// How often the watch loop wakes up to re-render.
    pub watch_tick_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub opportunities_page_size: u32,
    pub multi_exchange_limit: u32,
    pub tokens_page_size: u32,
    pub exchanges_page_size: u32,
    pub analytics_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Fallback filter when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily-rotated file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---
// Out of the box the dashboard polls a backend on localhost.

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            stale_time_secs: 5 * 60,
            cache_time_secs: 10 * 60,
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            health_secs: 30,
            opportunity_stats_secs: 60,
            analytics_secs: 300,
            exchange_health_secs: 60,
            exchange_health_page_secs: 30,
            opportunities_secs: 60,
            tokens_secs: 120,
            exchanges_secs: 60,
            watch_tick_secs: 5,
        }
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            opportunities_page_size: 20,
            multi_exchange_limit: 10,
            tokens_page_size: 20,
            exchanges_page_size: 50,
            analytics_limit: 10,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "wiggle.log".to_string(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheSettings {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn cache_time(&self) -> Duration {
        Duration::from_secs(self.cache_time_secs)
    }
}

impl RefreshSettings {
    pub fn watch_tick(&self) -> Duration {
        Duration::from_secs(self.watch_tick_secs)
    }
}

/// Command-line overrides that take precedence over file and environment values.
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Backend base URL, including the `/api/v1` prefix.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub timeout_secs: Option<u64>,

    /// Log filter used when RUST_LOG is not set (e.g. "debug").
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub log_level: Option<String>,
}

impl Config {
    /// Applies command-line overrides and re-validates the result.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(base_url) = &overrides.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.api.timeout_secs = timeout_secs;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::ValidationError("api.base_url must not be empty".to_string()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("api.timeout_secs must be positive".to_string()));
        }
        if self.refresh.watch_tick_secs == 0 {
            return Err(ConfigError::ValidationError(
                "refresh.watch_tick_secs must be positive".to_string(),
            ));
        }

        let page_sizes = [
            ("pagination.opportunities_page_size", self.pagination.opportunities_page_size),
            ("pagination.multi_exchange_limit", self.pagination.multi_exchange_limit),
            ("pagination.tokens_page_size", self.pagination.tokens_page_size),
            ("pagination.exchanges_page_size", self.pagination.exchanges_page_size),
            ("pagination.analytics_limit", self.pagination.analytics_limit),
        ];
        if let Some((name, _)) = page_sizes.iter().find(|(_, size)| *size == 0) {
            return Err(ConfigError::ValidationError(format!("{} must be positive", name)));
        }

        Ok(())
    }
}
