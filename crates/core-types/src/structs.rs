use crate::enums::{Chain, ExchangeType, OpportunityClass, Priority, RiskLevel};
use crate::{count, timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// All records below are backend-owned snapshots. They are only ever
// deserialized and displayed, never built or edited locally.

/// A single trading opportunity detected by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub opportunity_class: OpportunityClass,
    pub estimated_return_percent: f64,
    pub capital_required_usd: f64,
    #[serde(default)]
    pub net_return_percent: Option<f64>,
    #[serde(default)]
    pub duration_hours: f64,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub source_exchanges: Vec<String>,
    #[serde(default)]
    pub token_symbol: Option<String>,
    #[serde(default)]
    pub confidence_score: f64,
    pub is_executed: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

/// Backend-computed aggregate of the opportunities found for one symbol
/// across several exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiExchangeOpportunity {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(deserialize_with = "count::deserialize")]
    pub total_opportunities: u64,
    pub best_overall_return: f64,
    pub priority: Priority,
    #[serde(default)]
    pub supported_exchanges: Vec<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub analysis_timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub next_scan_at: Option<DateTime<Utc>>,
}

/// Token reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub chain: Chain,
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// An exchange together with the request counters the backend keeps for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: String,
    pub name: String,
    pub exchange_type: ExchangeType,
    pub is_active: bool,
    #[serde(deserialize_with = "count::deserialize")]
    pub rate_limit_per_minute: u32,
    #[serde(default)]
    pub supports_historical_data: bool,
    #[serde(default)]
    pub supports_websocket: bool,
    #[serde(default)]
    pub supported_chains: Vec<String>,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub total_requests: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub total_errors: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub consecutive_errors: u64,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_successful_request: Option<DateTime<Utc>>,
    #[serde(default)]
    pub average_response_time_ms: Option<f64>,
}

impl Exchange {
    /// Share of failed requests in percent; zero when nothing was requested yet.
    pub fn error_rate_percent(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.total_errors as f64 / self.total_requests as f64 * 100.0
    }
}

// --- Analytics reports ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_date: String,
    pub end_date: String,
    #[serde(deserialize_with = "count::deserialize")]
    pub days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityTotals {
    #[serde(deserialize_with = "count::deserialize")]
    pub total: u64,
    #[serde(deserialize_with = "count::deserialize")]
    pub executed: u64,
    #[serde(deserialize_with = "count::deserialize")]
    pub pending: u64,
    pub average_return: f64,
    pub max_return: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniqueCount {
    #[serde(deserialize_with = "count::deserialize")]
    pub unique_count: u64,
}

/// Aggregate counts over a time window, from `GET /analytics/overview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub time_range: TimeRange,
    pub opportunities: OpportunityTotals,
    pub tokens: UniqueCount,
    pub exchanges: UniqueCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPerformance {
    pub symbol: String,
    #[serde(deserialize_with = "count::deserialize")]
    pub total_opportunities: u64,
    pub average_return: f64,
    pub max_return: f64,
    #[serde(default)]
    pub total_volume_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPerformanceReport {
    #[serde(default)]
    pub tokens: Vec<TokenPerformance>,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangePairAnalytics {
    pub pair_name: String,
    #[serde(deserialize_with = "count::deserialize")]
    pub total_opportunities: u64,
    pub average_return: f64,
    pub max_return: f64,
    #[serde(default)]
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangePairReport {
    #[serde(default)]
    pub exchange_pairs: Vec<ExchangePairAnalytics>,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub total_pairs: u64,
}

// --- Summary endpoints ---
// The two summary payloads are only loosely specified by the backend, so the
// fields the pages read are typed and anything else is kept as raw JSON.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatistics {
    #[serde(default)]
    pub average_return_percent: f64,
    #[serde(default)]
    pub max_return_percent: Option<f64>,
    #[serde(default)]
    pub min_return_percent: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /opportunities/stats/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityStats {
    #[serde(default, deserialize_with = "count::deserialize")]
    pub total_opportunities: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub executed_opportunities: u64,
    #[serde(default)]
    pub return_statistics: ReturnStatistics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /exchanges/health/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeHealthSummary {
    #[serde(default, deserialize_with = "count::deserialize")]
    pub total_exchanges: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub active_exchanges: u64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub healthy_exchanges: u64,
    #[serde(default)]
    pub error_rate_percent: f64,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub total_requests: u64,
    /// Either plain exchange names or objects carrying a `name` field.
    #[serde(default)]
    pub unhealthy_exchanges: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExchangeHealthSummary {
    pub fn unhealthy_names(&self) -> Vec<String> {
        self.unhealthy_exchanges
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) => Some(name.clone()),
                Value::Object(fields) => fields
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect()
    }
}

// --- Health ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(default)]
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub database: ComponentHealth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub status: String,
    pub database: String,
    #[serde(default, deserialize_with = "count::deserialize")]
    pub collections: u64,
    #[serde(rename = "dataSize", default, deserialize_with = "count::deserialize")]
    pub data_size: u64,
    #[serde(rename = "storageSize", default, deserialize_with = "count::deserialize")]
    pub storage_size: u64,
}

/// Liveness snapshot from `GET /health` and `GET /health/detailed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub uptime_seconds: f64,
    #[serde(default)]
    pub components: Option<Components>,
    #[serde(default)]
    pub database: Option<DatabaseStats>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

// --- Shapes shared by all list endpoints ---

/// The normalised result of every paginated list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(deserialize_with = "count::deserialize")]
    pub total: u64,
    #[serde(deserialize_with = "count::deserialize")]
    pub page: u32,
    #[serde(deserialize_with = "count::deserialize")]
    pub page_size: u32,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    /// Number of pages needed to show `total` items.
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    /// Whether the list is long enough to need a pager at all.
    pub fn needs_pagination(&self) -> bool {
        self.total > u64::from(self.page_size)
    }
}

/// A single bar or slice in a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TimeRange {
    pub fn start(&self) -> Option<NaiveDate> {
        timestamp::parse_timestamp(&self.start_date)
            .ok()
            .map(|dt| dt.date_naive())
    }

    pub fn end(&self) -> Option<NaiveDate> {
        timestamp::parse_timestamp(&self.end_date)
            .ok()
            .map(|dt| dt.date_naive())
    }
}
