use configuration::CacheSettings;
use std::time::Duration;

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(10 * 60);

/// Per-query caching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Age after which cached data is refetched on the next read.
    pub stale_time: Duration,
    /// How long an unused entry survives before `QueryClient::gc` drops it.
    pub cache_time: Duration,
    /// Polling cadence in watch mode. Data older than this is refetched even
    /// while it is still within `stale_time`.
    pub refetch_interval: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            cache_time: DEFAULT_CACHE_TIME,
            refetch_interval: None,
        }
    }
}

impl From<&CacheSettings> for QueryOptions {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            stale_time: settings.stale_time(),
            cache_time: settings.cache_time(),
            refetch_interval: None,
        }
    }
}

impl QueryOptions {
    pub fn polling(mut self, every: Duration) -> Self {
        self.refetch_interval = Some(every);
        self
    }

    /// The age at which an entry must be refetched.
    pub fn refresh_after(&self) -> Duration {
        match self.refetch_interval {
            Some(interval) => interval.min(self.stale_time),
            None => self.stale_time,
        }
    }
}
