use crate::context::ViewContext;
use crate::render::{heading, key_values, push_line, push_table, table, toned};
use crate::status::PageStatus;
use core_types::{AnalyticsOverview, ExchangeHealthSummary, HealthStatus, OpportunityStats};
use formatting::{Tone, format_bytes, format_number, format_percentage};
use query_cache::{QueryKey, QueryState};

/// Window of the dashboard's summary card.
pub const SUMMARY_DAYS: u32 = 7;

pub struct DashboardData {
    pub health: QueryState<HealthStatus>,
    pub stats: QueryState<OpportunityStats>,
    pub analytics: QueryState<AnalyticsOverview>,
    pub exchange_health: QueryState<ExchangeHealthSummary>,
}

impl DashboardData {
    pub fn status(&self) -> PageStatus {
        PageStatus::default()
            .track("system health", &self.health)
            .track("opportunity stats", &self.stats)
            .track("analytics", &self.analytics)
            .track("exchange health", &self.exchange_health)
    }
}

/// Issues the four dashboard queries concurrently.
pub async fn load(ctx: &ViewContext) -> DashboardData {
    let refresh = ctx.refresh();
    let (health, stats, analytics, exchange_health) = tokio::join!(
        ctx.query(QueryKey::new("health").with("detailed"), refresh.health_secs, |api| async move {
            api.detailed_health().await
        }),
        ctx.query(QueryKey::new("opportunity-stats"), refresh.opportunity_stats_secs, |api| async move {
            api.opportunity_stats().await
        }),
        ctx.query(
            QueryKey::new("analytics-overview").with(&SUMMARY_DAYS),
            refresh.analytics_secs,
            |api| async move { api.analytics_overview(SUMMARY_DAYS).await }
        ),
        ctx.query(QueryKey::new("exchange-health"), refresh.exchange_health_secs, |api| async move {
            api.exchange_health_summary().await
        }),
    );
    DashboardData {
        health,
        stats,
        analytics,
        exchange_health,
    }
}

pub fn render(data: &DashboardData) -> String {
    let mut out = String::new();
    let status = data.status();
    heading(&mut out, "Dashboard");
    if status.is_loading {
        push_line(&mut out, "Loading...");
        return out;
    }
    for line in status.error_lines() {
        push_line(&mut out, line);
    }

    render_system_status(&mut out, data.health.data());
    render_metrics(&mut out, data.stats.data(), data.exchange_health.data());
    render_summary(&mut out, data.analytics.data());
    render_exchange_health(&mut out, data.exchange_health.data());
    out
}

fn render_system_status(out: &mut String, health: Option<&HealthStatus>) {
    heading(out, "System Status");
    let healthy = health.is_some_and(HealthStatus::is_healthy);
    let mut card = key_values(Vec::new());
    card.add_row(vec![
        comfy_table::Cell::new("Status"),
        toned(
            if healthy { "Healthy" } else { "Degraded" },
            if healthy { Tone::Positive } else { Tone::Negative },
        ),
    ]);
    if let Some(health) = health {
        card.add_row(vec!["Environment".to_string(), health.environment.clone()]);
        card.add_row(vec!["Version".to_string(), health.version.clone()]);
        if let Some(db) = &health.database {
            card.add_row(vec![
                "Database".to_string(),
                format!("{} collections, {}", db.collections, format_bytes(db.data_size)),
            ]);
        }
    }
    push_table(out, &card);
}

fn render_metrics(out: &mut String, stats: Option<&OpportunityStats>, exchanges: Option<&ExchangeHealthSummary>) {
    heading(out, "Key Metrics");
    let mut cards = table(&["Total Opportunities", "Executed", "Avg Return", "Active Exchanges"]);
    cards.add_row(vec![
        stats.map_or(0, |s| s.total_opportunities).to_string(),
        stats.map_or(0, |s| s.executed_opportunities).to_string(),
        format_percentage(
            stats.map_or(0.0, |s| s.return_statistics.average_return_percent),
            2,
        ),
        exchanges.map_or(0, |e| e.active_exchanges).to_string(),
    ]);
    push_table(out, &cards);
}

fn render_summary(out: &mut String, analytics: Option<&AnalyticsOverview>) {
    heading(out, &format!("{}-Day Summary", SUMMARY_DAYS));
    let Some(analytics) = analytics else {
        push_line(out, "No analytics data available");
        return;
    };
    push_table(
        out,
        &key_values(vec![
            ("Total Opportunities", analytics.opportunities.total.to_string()),
            ("Executed", analytics.opportunities.executed.to_string()),
            ("Max Return", format_percentage(analytics.opportunities.max_return, 2)),
            ("Unique Tokens", analytics.tokens.unique_count.to_string()),
        ]),
    );
}

fn render_exchange_health(out: &mut String, summary: Option<&ExchangeHealthSummary>) {
    heading(out, "Exchange Health");
    let Some(summary) = summary else {
        push_line(out, "No exchange health data available");
        return;
    };
    push_table(
        out,
        &key_values(vec![
            ("Total Exchanges", summary.total_exchanges.to_string()),
            ("Healthy", summary.healthy_exchanges.to_string()),
            ("Error Rate", format_percentage(summary.error_rate_percent, 2)),
            ("Total Requests", format_number(summary.total_requests as f64, 0)),
        ]),
    );
    if let Some(warning) = attention_warning(summary) {
        push_line(out, warning);
    }
}

/// `N exchanges need attention` when the backend flagged any as unhealthy.
pub fn attention_warning(summary: &ExchangeHealthSummary) -> Option<String> {
    let count = summary.unhealthy_exchanges.len();
    if count == 0 {
        return None;
    }
    let names = summary.unhealthy_names();
    if names.is_empty() {
        Some(format!("⚠ {} exchanges need attention", count))
    } else {
        Some(format!("⚠ {} exchanges need attention: {}", count, names.join(", ")))
    }
}
