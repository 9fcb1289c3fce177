//! Single-record pages, token search, raw analysis history and service health.

use crate::context::ViewContext;
use crate::exchanges::{ErrorRateTone, features};
use crate::opportunities::class_label;
use crate::render::{error_line, first_of, heading, key_values, push_line, push_table, yes_no};
use crate::tokens::{short_address, token_table};
use chrono::{DateTime, Utc};
use core_types::{Exchange, HealthStatus, Opportunity, Token};
use formatting::{
    NOT_AVAILABLE, format_currency, format_date, format_decimal, format_duration, format_number,
    format_percentage, format_time_ago,
};
use query_cache::{QueryKey, QueryState};
use serde_json::Value;

pub async fn load_opportunity(ctx: &ViewContext, id: &str) -> QueryState<Opportunity> {
    let owned = id.to_string();
    ctx.query(QueryKey::new("opportunity").with(id), ctx.refresh().opportunities_secs, move |api| async move {
        api.opportunity(&owned).await
    })
    .await
}

pub async fn load_token(ctx: &ViewContext, id: &str) -> QueryState<Token> {
    let owned = id.to_string();
    ctx.query(QueryKey::new("token").with(id), ctx.refresh().tokens_secs, move |api| async move {
        api.token(&owned).await
    })
    .await
}

pub async fn load_exchange(ctx: &ViewContext, id: &str) -> QueryState<Exchange> {
    let owned = id.to_string();
    ctx.query(QueryKey::new("exchange").with(id), ctx.refresh().exchanges_secs, move |api| async move {
        api.exchange(&owned).await
    })
    .await
}

pub async fn load_search(ctx: &ViewContext, symbol: &str, limit: u32) -> QueryState<Vec<Token>> {
    let owned = symbol.to_string();
    ctx.query(
        QueryKey::new("token-search").with(symbol).with(&limit),
        ctx.refresh().tokens_secs,
        move |api| async move { api.search_tokens(&owned, limit).await },
    )
    .await
}

pub async fn load_history(ctx: &ViewContext, days: u32, limit: u32) -> QueryState<Value> {
    ctx.query(
        QueryKey::new("analysis-history").with(&days).with(&limit),
        ctx.refresh().analytics_secs,
        move |api| async move { api.analysis_history(days, limit).await },
    )
    .await
}

pub async fn load_health(ctx: &ViewContext, detailed: bool) -> QueryState<HealthStatus> {
    let variant = if detailed { "detailed" } else { "basic" };
    ctx.query(QueryKey::new("health").with(variant), ctx.refresh().health_secs, move |api| async move {
        if detailed {
            api.detailed_health().await
        } else {
            api.health().await
        }
    })
    .await
}

/// Shared prologue of the single-record pages: the error line, then the
/// record if there is one.
fn record<'a, T>(out: &mut String, what: &str, state: &'a QueryState<T>) -> Option<&'a T> {
    if let Some(message) = &state.error {
        push_line(out, error_line(what, message));
    }
    if state.data.is_none() && state.is_loading {
        push_line(out, "Loading...");
    }
    state.data()
}

pub fn render_opportunity(state: &QueryState<Opportunity>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    heading(&mut out, "Opportunity");
    let Some(o) = record(&mut out, "opportunity", state) else {
        return out;
    };
    push_table(
        &mut out,
        &key_values(vec![
            ("ID", o.id.clone()),
            ("Token", o.token_symbol.clone().unwrap_or_else(|| "Unknown Token".to_string())),
            ("Class", class_label(o.opportunity_class)),
            ("Estimated Return", format_percentage(o.estimated_return_percent, 2)),
            (
                "Net Return",
                o.net_return_percent
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format_percentage(v, 2)),
            ),
            ("Capital Required", format_currency(o.capital_required_usd, 2)),
            ("Duration", format_duration(o.duration_hours)),
            ("Risk Level", o.risk_level.to_string()),
            ("Confidence", format_decimal(o.confidence_score, 2)),
            ("Exchanges", o.source_exchanges.join(", ")),
            ("Status", if o.is_executed { "Executed" } else { "Pending" }.to_string()),
            ("Created", format!("{} ({})", format_date(&o.created_at), format_time_ago(o.created_at, now))),
            ("Updated", format!("{} ({})", format_date(&o.updated_at), format_time_ago(o.updated_at, now))),
        ]),
    );
    out
}

pub fn render_token(state: &QueryState<Token>) -> String {
    let mut out = String::new();
    heading(&mut out, "Token");
    let Some(t) = record(&mut out, "token", state) else {
        return out;
    };
    push_table(
        &mut out,
        &key_values(vec![
            ("ID", t.id.clone()),
            ("Symbol", t.symbol.clone()),
            ("Name", t.name.clone()),
            ("Chain", t.chain.as_str().to_uppercase()),
            ("Status", if t.is_active { "Active" } else { "Inactive" }.to_string()),
            ("Address", t.address.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())),
            ("Short Address", t.address.as_deref().map(short_address).unwrap_or_default()),
            ("Tags", t.tags.join(", ")),
            ("Notes", t.notes.clone()),
        ]),
    );
    out
}

pub fn render_exchange(state: &QueryState<Exchange>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    heading(&mut out, "Exchange");
    let Some(e) = record(&mut out, "exchange", state) else {
        return out;
    };
    let band = match ErrorRateTone::of(e) {
        ErrorRateTone::Ok => "ok",
        ErrorRateTone::Warning => "warning",
        ErrorRateTone::Error => "error",
    };
    push_table(
        &mut out,
        &key_values(vec![
            ("ID", e.id.clone()),
            ("Name", e.name.clone()),
            ("Type", e.exchange_type.to_string()),
            ("Status", if e.is_active { "Active" } else { "Inactive" }.to_string()),
            ("Rate Limit", format!("{}/min", e.rate_limit_per_minute)),
            ("Total Requests", format_number(e.total_requests as f64, 0)),
            ("Errors", format!("{} ({} consecutive)", e.total_errors, e.consecutive_errors)),
            ("Error Rate", format!("{} ({})", format_percentage(e.error_rate_percent(), 2), band)),
            (
                "Avg Response",
                e.average_response_time_ms
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |ms| format!("{:.0}ms", ms)),
            ),
            (
                "Last Success",
                e.last_successful_request
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |at| format_time_ago(at, now)),
            ),
            ("Historical Data", yes_no(e.supports_historical_data).to_string()),
            ("WebSocket", yes_no(e.supports_websocket).to_string()),
            ("Features", features(e)),
            ("Chains", first_of(&e.supported_chains, e.supported_chains.len(), true)),
        ]),
    );
    out
}

pub fn render_search(symbol: &str, state: &QueryState<Vec<Token>>) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Token search: {}", symbol));
    let Some(hits) = record(&mut out, "token search", state) else {
        return out;
    };
    if hits.is_empty() {
        push_line(&mut out, format!("No tokens match '{}'", symbol));
    } else {
        push_table(&mut out, &token_table(hits));
    }
    out
}

pub fn render_history(state: &QueryState<Value>) -> String {
    let mut out = String::new();
    heading(&mut out, "Analysis History");
    let Some(history) = record(&mut out, "analysis history", state) else {
        return out;
    };
    match serde_json::to_string_pretty(history) {
        Ok(pretty) => push_line(&mut out, pretty),
        Err(e) => push_line(&mut out, error_line("analysis history", &e.to_string())),
    }
    out
}

pub fn render_health(state: &QueryState<HealthStatus>) -> String {
    let mut out = String::new();
    heading(&mut out, "Service Health");
    let Some(h) = record(&mut out, "system health", state) else {
        return out;
    };
    let mut rows = vec![
        ("Status", if h.is_healthy() { "Healthy" } else { "Degraded" }.to_string()),
        ("Reported", format_date(&h.timestamp)),
        ("Version", h.version.clone()),
        ("Environment", h.environment.clone()),
        ("Uptime", format_duration(h.uptime_seconds / 3600.0)),
    ];
    if let Some(components) = &h.components {
        rows.push((
            "Database Link",
            format!(
                "{} ({})",
                components.database.status,
                if components.database.connected { "connected" } else { "disconnected" }
            ),
        ));
    }
    if let Some(db) = &h.database {
        rows.push(("Database", format!("{} ({})", db.database, db.status)));
        rows.push(("Collections", db.collections.to_string()));
        rows.push(("Data Size", formatting::format_bytes(db.data_size)));
        rows.push(("Storage Size", formatting::format_bytes(db.storage_size)));
    }
    push_table(&mut out, &key_values(rows));
    out
}
