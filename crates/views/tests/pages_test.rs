use api_client::DashboardApi;
use api_client::error::ApiError;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use configuration::Config;
use core_types::{
    AnalyticsOverview, Chain, Exchange, ExchangeFilters, ExchangeHealthSummary, ExchangePairAnalytics,
    ExchangePairReport, ExchangeType, HealthStatus, MultiExchangeFilters, MultiExchangeOpportunity,
    Opportunity, OpportunityClass, OpportunityFilters, OpportunityStats, OpportunityTotals, Paginated,
    Priority, RiskLevel, TimeRange, Token, TokenFilters, TokenPerformance, TokenPerformanceReport,
    UniqueCount,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;
use views::{AnalyticsWindow, ListState, ViewContext, analytics, dashboard, detail, exchanges, opportunities, tokens};

/// In-memory backend that records every call it serves.
#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<String>>,
    fail_stats: bool,
}

impl FakeBackend {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn health() -> HealthStatus {
    serde_json::from_value(json!({
        "status": "healthy",
        "timestamp": "2024-03-01T12:00:00Z",
        "version": "1.4.2",
        "environment": "production",
        "uptime_seconds": 90000.0,
        "database": {"status": "ok", "database": "wiggle", "collections": 12,
                     "dataSize": 1048576, "storageSize": 2097152}
    }))
    .unwrap()
}

fn opportunity(i: u32) -> Opportunity {
    Opportunity {
        id: format!("opp-{}", i),
        opportunity_class: OpportunityClass::MultiExchangeArbitrage,
        estimated_return_percent: 2.345,
        capital_required_usd: 12_500.0,
        net_return_percent: Some(1.9),
        duration_hours: 36.0,
        risk_level: RiskLevel::High,
        source_exchanges: vec!["binance".into(), "kraken".into()],
        token_symbol: if i == 0 { None } else { Some("ETH".into()) },
        confidence_score: 0.75,
        is_executed: false,
        created_at: ts(),
        updated_at: ts(),
    }
}

fn token() -> Token {
    Token {
        id: "t1".into(),
        symbol: "USDC".into(),
        name: "USD Coin".into(),
        address: Some("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".into()),
        chain: Chain::Ethereum,
        is_active: true,
        tags: vec!["stable".into(), "defi".into(), "l1".into(), "fiat".into(), "usd".into()],
        notes: "n".repeat(150),
    }
}

fn exchange() -> Exchange {
    Exchange {
        id: "x1".into(),
        name: "Kraken".into(),
        exchange_type: ExchangeType::Cex,
        is_active: true,
        rate_limit_per_minute: 900,
        supports_historical_data: true,
        supports_websocket: true,
        supported_chains: vec!["ethereum".into(), "bitcoin".into(), "bsc".into(), "polygon".into()],
        total_requests: 2000,
        total_errors: 20,
        consecutive_errors: 1,
        last_successful_request: Some(ts() - chrono::Duration::minutes(5)),
        average_response_time_ms: Some(182.4),
    }
}

#[async_trait]
impl DashboardApi for FakeBackend {
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.record("health".into());
        Ok(health())
    }

    async fn detailed_health(&self) -> Result<HealthStatus, ApiError> {
        self.record("detailed_health".into());
        Ok(health())
    }

    async fn opportunities(
        &self,
        page: u32,
        page_size: u32,
        filters: &OpportunityFilters,
    ) -> Result<Paginated<Opportunity>, ApiError> {
        self.record(format!("opportunities page={} size={} risk={:?}", page, page_size, filters.risk_level));
        Ok(Paginated {
            items: (0..3).map(opportunity).collect(),
            total: 43,
            page,
            page_size,
            has_next: true,
        })
    }

    async fn opportunity(&self, id: &str) -> Result<Opportunity, ApiError> {
        self.record(format!("opportunity {}", id));
        if id == "missing" {
            return Err(ApiError::Rejected {
                status: 404,
                message: "Opportunity not found".into(),
            });
        }
        Ok(opportunity(1))
    }

    async fn multi_exchange_opportunities(
        &self,
        page: u32,
        page_size: u32,
        _filters: &MultiExchangeFilters,
    ) -> Result<Paginated<MultiExchangeOpportunity>, ApiError> {
        self.record(format!("multi_exchange page={} size={}", page, page_size));
        Ok(Paginated {
            items: vec![MultiExchangeOpportunity {
                id: "m1".into(),
                symbol: "BTC".into(),
                name: "Bitcoin".into(),
                total_opportunities: 8,
                best_overall_return: 4.2,
                priority: Priority::High,
                supported_exchanges: vec!["binance".into(), "okx".into()],
                analysis_timestamp: ts(),
                next_scan_at: None,
            }],
            total: 1,
            page,
            page_size,
            has_next: false,
        })
    }

    async fn opportunity_stats(&self) -> Result<OpportunityStats, ApiError> {
        self.record("opportunity_stats".into());
        if self.fail_stats {
            return Err(ApiError::Server { status: 500 });
        }
        Ok(serde_json::from_value(json!({
            "total_opportunities": 120,
            "executed_opportunities": 30,
            "return_statistics": {"average_return_percent": 2.5}
        }))
        .unwrap())
    }

    async fn tokens(
        &self,
        page: u32,
        page_size: u32,
        _filters: &TokenFilters,
    ) -> Result<Paginated<Token>, ApiError> {
        self.record(format!("tokens page={} size={}", page, page_size));
        Ok(Paginated {
            items: vec![token()],
            total: 1,
            page,
            page_size,
            has_next: false,
        })
    }

    async fn token(&self, id: &str) -> Result<Token, ApiError> {
        self.record(format!("token {}", id));
        Ok(token())
    }

    async fn search_tokens(&self, symbol: &str, limit: u32) -> Result<Vec<Token>, ApiError> {
        self.record(format!("search {} limit={}", symbol, limit));
        Ok(vec![])
    }

    async fn exchanges(
        &self,
        page: u32,
        page_size: u32,
        _filters: &ExchangeFilters,
    ) -> Result<Paginated<Exchange>, ApiError> {
        self.record(format!("exchanges page={} size={}", page, page_size));
        Ok(Paginated {
            items: vec![exchange()],
            total: 1,
            page,
            page_size,
            has_next: false,
        })
    }

    async fn exchange(&self, id: &str) -> Result<Exchange, ApiError> {
        self.record(format!("exchange {}", id));
        Ok(exchange())
    }

    async fn exchange_health_summary(&self) -> Result<ExchangeHealthSummary, ApiError> {
        self.record("exchange_health".into());
        Ok(serde_json::from_value(json!({
            "total_exchanges": 6,
            "active_exchanges": 5,
            "healthy_exchanges": 4,
            "error_rate_percent": 1.25,
            "total_requests": 250000,
            "unhealthy_exchanges": [{"name": "bitfinex"}, {"name": "gate"}]
        }))
        .unwrap())
    }

    async fn analytics_overview(&self, days: u32) -> Result<AnalyticsOverview, ApiError> {
        self.record(format!("overview days={}", days));
        Ok(AnalyticsOverview {
            time_range: TimeRange {
                start_date: "2024-02-23".into(),
                end_date: "2024-03-01".into(),
                days,
            },
            opportunities: OpportunityTotals {
                total: 77,
                executed: 11,
                pending: 66,
                average_return: 1.8,
                max_return: 9.75,
            },
            tokens: UniqueCount { unique_count: 14 },
            exchanges: UniqueCount { unique_count: 6 },
        })
    }

    async fn token_performance(&self, days: u32, limit: u32) -> Result<TokenPerformanceReport, ApiError> {
        self.record(format!("token_performance days={} limit={}", days, limit));
        Ok(TokenPerformanceReport {
            tokens: ["ETH", "BTC", "SOL", "ARB", "OP", "LINK"]
                .iter()
                .enumerate()
                .map(|(i, s)| TokenPerformance {
                    symbol: s.to_string(),
                    total_opportunities: 10 - i as u64,
                    average_return: 1.5,
                    max_return: 6.0,
                    total_volume_usd: 250_000.0,
                })
                .collect(),
            total_tokens: 6,
        })
    }

    async fn exchange_pair_analytics(&self, days: u32, limit: u32) -> Result<ExchangePairReport, ApiError> {
        self.record(format!("pairs days={} limit={}", days, limit));
        Ok(ExchangePairReport {
            exchange_pairs: vec![ExchangePairAnalytics {
                pair_name: "binance→kraken".into(),
                total_opportunities: 9,
                average_return: 1.2,
                max_return: 3.0,
                success_rate: 66.7,
            }],
            total_pairs: 1,
        })
    }

    async fn analysis_history(&self, days: u32, limit: u32) -> Result<Value, ApiError> {
        self.record(format!("history days={} limit={}", days, limit));
        Ok(json!({"runs": [{"id": 1, "found": 4}]}))
    }
}

fn context(backend: FakeBackend) -> (Arc<FakeBackend>, ViewContext) {
    let backend = Arc::new(backend);
    let api: Arc<dyn DashboardApi> = backend.clone();
    (backend, ViewContext::new(api, Config::default()))
}

#[tokio::test]
async fn dashboard_loads_four_queries_and_renders_cards() {
    let (backend, ctx) = context(FakeBackend::default());
    let data = dashboard::load(&ctx).await;

    let mut calls = backend.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec!["detailed_health", "exchange_health", "opportunity_stats", "overview days=7"]
    );
    assert!(!data.status().is_loading);

    let text = dashboard::render(&data);
    assert!(text.contains("Healthy"));
    assert!(text.contains("production"));
    assert!(text.contains("12 collections, 1.0 MB"));
    assert!(text.contains("2.50%"));
    assert!(text.contains("7-Day Summary"));
    assert!(text.contains("9.75%"));
    assert!(text.contains("2 exchanges need attention: bitfinex, gate"));
}

#[tokio::test]
async fn dashboard_keeps_rendering_when_one_query_fails() {
    let (_, ctx) = context(FakeBackend {
        fail_stats: true,
        ..FakeBackend::default()
    });
    let data = dashboard::load(&ctx).await;
    assert!(data.status().has_errors());

    let text = dashboard::render(&data);
    assert!(text.contains(
        "Error loading opportunity stats: Server error. Please contact support if the problem persists."
    ));
    assert!(text.contains("Exchange Health"));
    assert!(text.contains("Healthy"));
}

#[tokio::test]
async fn second_load_is_served_from_cache() {
    let (backend, ctx) = context(FakeBackend::default());
    dashboard::load(&ctx).await;
    dashboard::load(&ctx).await;
    assert_eq!(backend.calls().len(), 4);
}

#[tokio::test]
async fn opportunities_page_requests_the_selected_page() {
    let (backend, ctx) = context(FakeBackend::default());
    let mut list = opportunities::initial_state(&ctx);
    list.set_page(2);

    let data = opportunities::load(&ctx, &list, None).await;
    let calls = backend.calls();
    assert!(calls.contains(&"opportunities page=2 size=20 risk=None".to_string()));
    assert!(calls.contains(&"multi_exchange page=1 size=10".to_string()));

    let text = opportunities::render(&data);
    assert!(text.contains("Individual Opportunities (43)"));
    assert!(text.contains("Unknown Token"));
    assert!(text.contains("MULTI EXCHANGE ARBITRAGE"));
    assert!(text.contains("1d 12h"));
    assert!(text.contains("Page 2 of 3 (43 total)"));
    assert!(text.contains("Bitcoin (BTC)"));

    list.update_filters(|f| f.risk_level = Some(RiskLevel::Low));
    assert_eq!(list.page(), 1);
    opportunities::load(&ctx, &list, Some(&data.opportunities)).await;
    assert!(backend
        .calls()
        .contains(&"opportunities page=1 size=20 risk=Some(Low)".to_string()));
}

#[tokio::test]
async fn tokens_page_shortens_long_fields() {
    let (_, ctx) = context(FakeBackend::default());
    let list: ListState<TokenFilters> = tokens::initial_state(&ctx);
    let text = tokens::render(&tokens::load(&ctx, &list, None).await);

    assert!(text.contains("0xA0b86991...3606eB48"));
    assert!(text.contains("+2 more"));
    assert!(text.contains("ETHEREUM"));
    assert!(!text.contains(&"n".repeat(101)));
}

#[tokio::test]
async fn exchanges_page_shows_health_and_rates() {
    let (backend, ctx) = context(FakeBackend::default());
    let data = exchanges::load(&ctx, &ExchangeFilters::default()).await;
    assert!(backend.calls().contains(&"exchanges page=1 size=50".to_string()));

    let text = exchanges::render(&data, ts());
    assert!(text.contains("Health Summary"));
    assert!(text.contains("1.25%"));
    assert!(text.contains("250.0K"));
    assert!(text.contains("900/min"));
    assert!(text.contains("1.00%"));
    assert!(text.contains("5 minutes ago"));
    assert!(text.contains("+1 more"));
}

#[tokio::test]
async fn analytics_page_uses_the_selected_window() {
    let (backend, ctx) = context(FakeBackend::default());
    let data = analytics::load(&ctx, AnalyticsWindow::Quarter).await;

    let calls = backend.calls();
    assert!(calls.contains(&"overview days=90".to_string()));
    assert!(calls.contains(&"token_performance days=90 limit=10".to_string()));
    assert!(calls.contains(&"pairs days=90 limit=10".to_string()));

    let text = analytics::render(&data);
    assert!(text.contains("Last 90 days"));
    assert!(text.contains("Feb 23 to Mar 01"));
    assert!(text.contains("binance → kraken"));
    assert!(text.contains("Token Performance Details"));
    // Six tokens charted, five detailed.
    assert!(text.contains("LINK"));
    assert_eq!(text.matches("opportunities").count(), 6);
}

#[tokio::test]
async fn detail_pages_render_records_and_errors() {
    let (_, ctx) = context(FakeBackend::default());

    let missing = detail::load_opportunity(&ctx, "missing").await;
    assert_eq!(
        detail::render_opportunity(&missing, ts()).lines().last(),
        Some("Error loading opportunity: Opportunity not found")
    );

    let found = detail::render_opportunity(&detail::load_opportunity(&ctx, "opp-1").await, ts());
    assert!(found.contains("$12.5K"));
    assert!(found.contains("2.35%"));

    let search = detail::render_search("ZZZ", &detail::load_search(&ctx, "ZZZ", 10).await);
    assert!(search.contains("No tokens match 'ZZZ'"));

    let history = detail::render_history(&detail::load_history(&ctx, 30, 10).await);
    assert!(history.contains("\"found\": 4"));

    let exchange = detail::render_exchange(&detail::load_exchange(&ctx, "x1").await, ts());
    assert!(exchange.contains("(warning)"));

    let health = detail::render_health(&detail::load_health(&ctx, false).await);
    assert!(health.contains("1d 1h"));
}
