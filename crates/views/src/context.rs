use api_client::DashboardApi;
use api_client::error::ApiError;
use configuration::{Config, PaginationSettings, RefreshSettings};
use query_cache::{QueryClient, QueryKey, QueryOptions, QueryState};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Everything a page needs to load its data: the backend, the shared query
/// cache and the effective configuration.
#[derive(Clone)]
pub struct ViewContext {
    pub api: Arc<dyn DashboardApi>,
    pub cache: QueryClient,
    pub config: Arc<Config>,
}

impl ViewContext {
    pub fn new(api: Arc<dyn DashboardApi>, config: Config) -> Self {
        Self {
            api,
            cache: QueryClient::new(),
            config: Arc::new(config),
        }
    }

    pub fn refresh(&self) -> &RefreshSettings {
        &self.config.refresh
    }

    pub fn pagination(&self) -> &PaginationSettings {
        &self.config.pagination
    }

    /// Cache policy for a query polled every `refresh_secs`.
    pub fn options(&self, refresh_secs: u64) -> QueryOptions {
        QueryOptions::from(&self.config.cache).polling(Duration::from_secs(refresh_secs))
    }

    /// Runs one backend call through the cache.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, refresh_secs: u64, call: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Arc<dyn DashboardApi>) -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        tracing::trace!(%key, refresh_secs, "Loading query.");
        let api = Arc::clone(&self.api);
        self.cache
            .fetch(key, &self.options(refresh_secs), move || call(api))
            .await
    }
}
