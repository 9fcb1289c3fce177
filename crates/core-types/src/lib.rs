//! # Wiggle Core Types
//!
//! The catalogue of JSON shapes the Wiggle backend serves, plus the filter
//! criteria the dashboard forwards to it. Layer 0: no I/O, no other workspace
//! dependencies.

pub mod count;
pub mod enums;
pub mod error;
pub mod filters;
pub mod structs;
pub mod timestamp;

// Re-export the core types to provide a clean public API.
pub use enums::{Chain, ExchangeType, OpportunityClass, Priority, RiskLevel};
pub use error::CoreError;
pub use filters::{ExchangeFilters, MultiExchangeFilters, OpportunityFilters, TokenFilters};
pub use structs::{
    AnalyticsOverview, ChartDataPoint, ComponentHealth, Components, DatabaseStats, Exchange,
    ExchangeHealthSummary, ExchangePairAnalytics, ExchangePairReport, HealthStatus,
    MultiExchangeOpportunity, Opportunity, OpportunityStats, OpportunityTotals, Paginated,
    ReturnStatistics, TimeRange, Token, TokenPerformance,
    TokenPerformanceReport, UniqueCount,
};
