use crate::error::ApiError;
use crate::query::{LimitParams, PageParams, WindowParams, build_query};
use crate::responses::normalize_list;
use async_trait::async_trait;
use configuration::ApiSettings;
use core_types::{
    AnalyticsOverview, Exchange, ExchangeFilters, ExchangeHealthSummary, ExchangePairReport,
    HealthStatus, MultiExchangeFilters, MultiExchangeOpportunity, Opportunity, OpportunityFilters,
    OpportunityStats, Paginated, Token, TokenFilters, TokenPerformanceReport,
};
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub mod error;
pub mod query;
pub mod responses;
// --- Public API ---
pub use error::{SERVER_ERROR_MESSAGE, SERVICE_UNAVAILABLE_MESSAGE, UNEXPECTED_ERROR_MESSAGE};
pub use responses::ErrorBody;

/// Default number of hits returned by a token search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// The read-only contract of the Wiggle backend.
///
/// Every method maps to exactly one GET request: no retries, no caching, no
/// batching. Pages depend on this trait rather than on `WiggleClient`, so a
/// fake can stand in for the backend in tests.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// `GET /health/detailed`
    async fn detailed_health(&self) -> Result<HealthStatus, ApiError>;

    /// `GET /opportunities`
    async fn opportunities(
        &self,
        page: u32,
        page_size: u32,
        filters: &OpportunityFilters,
    ) -> Result<Paginated<Opportunity>, ApiError>;

    /// `GET /opportunities/{id}`
    async fn opportunity(&self, id: &str) -> Result<Opportunity, ApiError>;

    /// `GET /opportunities/multi-exchange`
    async fn multi_exchange_opportunities(
        &self,
        page: u32,
        page_size: u32,
        filters: &MultiExchangeFilters,
    ) -> Result<Paginated<MultiExchangeOpportunity>, ApiError>;

    /// `GET /opportunities/stats/summary`
    async fn opportunity_stats(&self) -> Result<OpportunityStats, ApiError>;

    /// `GET /tokens`
    async fn tokens(
        &self,
        page: u32,
        page_size: u32,
        filters: &TokenFilters,
    ) -> Result<Paginated<Token>, ApiError>;

    /// `GET /tokens/{id}`
    async fn token(&self, id: &str) -> Result<Token, ApiError>;

    /// `GET /tokens/search/{symbol}`
    async fn search_tokens(&self, symbol: &str, limit: u32) -> Result<Vec<Token>, ApiError>;

    /// `GET /exchanges`
    async fn exchanges(
        &self,
        page: u32,
        page_size: u32,
        filters: &ExchangeFilters,
    ) -> Result<Paginated<Exchange>, ApiError>;

    /// `GET /exchanges/{id}`
    async fn exchange(&self, id: &str) -> Result<Exchange, ApiError>;

    /// `GET /exchanges/health/summary`
    async fn exchange_health_summary(&self) -> Result<ExchangeHealthSummary, ApiError>;

    /// `GET /analytics/overview`
    async fn analytics_overview(&self, days: u32) -> Result<AnalyticsOverview, ApiError>;

    /// `GET /analytics/tokens/performance`
    async fn token_performance(&self, days: u32, limit: u32)
    -> Result<TokenPerformanceReport, ApiError>;

    /// `GET /analytics/exchange-pairs`
    async fn exchange_pair_analytics(
        &self,
        days: u32,
        limit: u32,
    ) -> Result<ExchangePairReport, ApiError>;

    /// `GET /analytics/analysis-history`. The backend does not pin this
    /// payload down, so it is returned as raw JSON.
    async fn analysis_history(&self, days: u32, limit: u32) -> Result<Value, ApiError>;
}

/// The HTTP implementation of `DashboardApi`.
#[derive(Clone)]
pub struct WiggleClient {
    client: reqwest::Client,
    base_url: Url,
}

impl WiggleClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::with_base_url(&settings.base_url, settings.timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::RequestBuild(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::RequestBuild(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestBuild(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path (percent-encoding each one) and
    /// attaches the query string, if any.
    fn endpoint(&self, segments: &[&str], query: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::RequestBuild(format!("base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &str) -> Result<T, ApiError> {
        let url = self.endpoint(segments, query)?;
        let body = self.send(url).await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            let err = ApiError::Deserialization(e.to_string());
            tracing::error!(error = %err, path = %segments.join("/"), "API Error");
            err
        })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &str,
        items_key: &str,
    ) -> Result<Paginated<T>, ApiError> {
        let body: Value = self.get(segments, query).await?;
        normalize_list(body, items_key).inspect_err(|err| {
            tracing::error!(error = %err, path = %segments.join("/"), "API Error");
        })
    }

    /// Performs the request and runs every outcome through one response hook:
    /// success bodies are returned as text, failures are classified and logged.
    async fn send(&self, url: Url) -> Result<String, ApiError> {
        tracing::debug!(%url, "GET");

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::Transport(e);
                tracing::error!(error = %err, %url, "API Error");
                return Err(err);
            }
        };

        let status = response.status();
        let text = response.text().await.inspect_err(|e| {
            tracing::error!(error = %e, %url, "API Error: failed to read response body");
        })?;

        if status.is_success() {
            Ok(text)
        } else {
            let err = ApiError::classify(status, &text);
            tracing::error!(status = status.as_u16(), error = %err, %url, "API Error");
            Err(err)
        }
    }
}

#[async_trait]
impl DashboardApi for WiggleClient {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get(&["health"], "").await
    }

    async fn detailed_health(&self) -> Result<HealthStatus, ApiError> {
        self.get(&["health", "detailed"], "").await
    }

    async fn opportunities(
        &self,
        page: u32,
        page_size: u32,
        filters: &OpportunityFilters,
    ) -> Result<Paginated<Opportunity>, ApiError> {
        let query = build_query(&[&PageParams { page, page_size }, filters])?;
        self.get_list(&["opportunities"], &query, "opportunities").await
    }

    async fn opportunity(&self, id: &str) -> Result<Opportunity, ApiError> {
        self.get(&["opportunities", id], "").await
    }

    async fn multi_exchange_opportunities(
        &self,
        page: u32,
        page_size: u32,
        filters: &MultiExchangeFilters,
    ) -> Result<Paginated<MultiExchangeOpportunity>, ApiError> {
        let query = build_query(&[&PageParams { page, page_size }, filters])?;
        self.get_list(&["opportunities", "multi-exchange"], &query, "opportunities")
            .await
    }

    async fn opportunity_stats(&self) -> Result<OpportunityStats, ApiError> {
        self.get(&["opportunities", "stats", "summary"], "").await
    }

    async fn tokens(
        &self,
        page: u32,
        page_size: u32,
        filters: &TokenFilters,
    ) -> Result<Paginated<Token>, ApiError> {
        let query = build_query(&[&PageParams { page, page_size }, filters])?;
        self.get_list(&["tokens"], &query, "tokens").await
    }

    async fn token(&self, id: &str) -> Result<Token, ApiError> {
        self.get(&["tokens", id], "").await
    }

    async fn search_tokens(&self, symbol: &str, limit: u32) -> Result<Vec<Token>, ApiError> {
        let query = build_query(&[&LimitParams { limit }])?;
        self.get(&["tokens", "search", symbol], &query).await
    }

    async fn exchanges(
        &self,
        page: u32,
        page_size: u32,
        filters: &ExchangeFilters,
    ) -> Result<Paginated<Exchange>, ApiError> {
        let query = build_query(&[&PageParams { page, page_size }, filters])?;
        self.get_list(&["exchanges"], &query, "exchanges").await
    }

    async fn exchange(&self, id: &str) -> Result<Exchange, ApiError> {
        self.get(&["exchanges", id], "").await
    }

    async fn exchange_health_summary(&self) -> Result<ExchangeHealthSummary, ApiError> {
        self.get(&["exchanges", "health", "summary"], "").await
    }

    async fn analytics_overview(&self, days: u32) -> Result<AnalyticsOverview, ApiError> {
        let query = build_query(&[&WindowParams { days, limit: None }])?;
        self.get(&["analytics", "overview"], &query).await
    }

    async fn token_performance(
        &self,
        days: u32,
        limit: u32,
    ) -> Result<TokenPerformanceReport, ApiError> {
        let query = build_query(&[&WindowParams { days, limit: Some(limit) }])?;
        self.get(&["analytics", "tokens", "performance"], &query).await
    }

    async fn exchange_pair_analytics(
        &self,
        days: u32,
        limit: u32,
    ) -> Result<ExchangePairReport, ApiError> {
        let query = build_query(&[&WindowParams { days, limit: Some(limit) }])?;
        self.get(&["analytics", "exchange-pairs"], &query).await
    }

    async fn analysis_history(&self, days: u32, limit: u32) -> Result<Value, ApiError> {
        let query = build_query(&[&WindowParams { days, limit: Some(limit) }])?;
        self.get(&["analytics", "analysis-history"], &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> WiggleClient {
        WiggleClient::with_base_url(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        let url = client("http://localhost:8000/api/v1").endpoint(&["tokens", "search", "ETH"], "limit=10").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/tokens/search/ETH?limit=10");
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let url = client("http://localhost:8000/api/v1/").endpoint(&["health"], "").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/health");
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let url = client("http://localhost:8000/api/v1").endpoint(&["tokens", "search", "BTC/USD"], "").unwrap();
        assert_eq!(url.path(), "/api/v1/tokens/search/BTC%2FUSD");
    }

    #[test]
    fn bad_base_urls_are_rejected() {
        assert!(WiggleClient::with_base_url("not a url", Duration::from_secs(1)).is_err());
        assert!(WiggleClient::with_base_url("mailto:ops@example.com", Duration::from_secs(1)).is_err());
    }
}
