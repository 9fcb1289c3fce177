use crate::context::ViewContext;
use crate::render::{error_line, first_of, heading, key_values, push_line, push_table, table, text_bar, toned};
use crate::status::PageStatus;
use chrono::{DateTime, Utc};
use core_types::{Exchange, ExchangeFilters, ExchangeHealthSummary, Paginated};
use formatting::{NOT_AVAILABLE, Tone, format_number, format_percentage, format_time_ago};
use query_cache::{QueryKey, QueryState};

/// Error rates at or above this share of requests are shown as failing.
pub const ERROR_RATE_WARNING_LIMIT: f64 = 0.05;
const VISIBLE_CHAINS: usize = 3;
const BAR_WIDTH: usize = 10;

/// Health band of one exchange's error rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorRateTone {
    Ok,
    Warning,
    Error,
}

impl ErrorRateTone {
    pub fn of(exchange: &Exchange) -> Self {
        if exchange.total_errors == 0 {
            return ErrorRateTone::Ok;
        }
        // Errors without any recorded request cannot be rated.
        if exchange.total_requests == 0 {
            return ErrorRateTone::Error;
        }
        let ratio = exchange.total_errors as f64 / exchange.total_requests as f64;
        if ratio < ERROR_RATE_WARNING_LIMIT {
            ErrorRateTone::Warning
        } else {
            ErrorRateTone::Error
        }
    }

    fn tone(self) -> Tone {
        match self {
            ErrorRateTone::Ok => Tone::Positive,
            ErrorRateTone::Warning => Tone::Neutral,
            ErrorRateTone::Error => Tone::Negative,
        }
    }
}

pub struct ExchangesData {
    pub filters: ExchangeFilters,
    pub exchanges: QueryState<Paginated<Exchange>>,
    pub health: QueryState<ExchangeHealthSummary>,
}

impl ExchangesData {
    pub fn status(&self) -> PageStatus {
        PageStatus::default()
            .track("exchanges", &self.exchanges)
            .track("exchange health", &self.health)
    }
}

/// Loads the first page of exchanges alongside the health summary.
pub async fn load(ctx: &ViewContext, filters: &ExchangeFilters) -> ExchangesData {
    let page_size = ctx.pagination().exchanges_page_size;
    let list_filters = filters.clone();

    let (exchanges, health) = tokio::join!(
        ctx.query(
            QueryKey::new("exchanges").with(&1u32).with(&page_size).with(filters),
            ctx.refresh().exchanges_secs,
            move |api| async move { api.exchanges(1, page_size, &list_filters).await }
        ),
        ctx.query(
            QueryKey::new("exchange-health"),
            ctx.refresh().exchange_health_page_secs,
            |api| async move { api.exchange_health_summary().await }
        ),
    );

    ExchangesData {
        filters: filters.clone(),
        exchanges,
        health,
    }
}

pub fn render(data: &ExchangesData, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    heading(&mut out, "Exchanges");
    if let Some(message) = &data.exchanges.error {
        push_line(&mut out, error_line("exchanges", message));
    }

    if let Some(summary) = data.health.data() {
        heading(&mut out, "Health Summary");
        push_table(
            &mut out,
            &key_values(vec![
                ("Total Exchanges", summary.total_exchanges.to_string()),
                ("Healthy", summary.healthy_exchanges.to_string()),
                ("Error Rate", format_percentage(summary.error_rate_percent, 2)),
                ("Total Requests", format_number(summary.total_requests as f64, 0)),
            ]),
        );
    }

    let Some(page) = data.exchanges.data() else {
        if data.exchanges.is_loading {
            push_line(&mut out, "Loading...");
        }
        return out;
    };

    heading(&mut out, &format!("Exchanges ({})", page.total));
    if page.items.is_empty() {
        push_line(&mut out, "No exchanges match the current filters");
        return out;
    }
    push_table(&mut out, &exchange_table(&page.items, now));
    out
}

fn exchange_table(exchanges: &[Exchange], now: DateTime<Utc>) -> comfy_table::Table {
    let mut t = table(&[
        "Name", "Status", "Type", "Rate Limit", "Requests", "Errors", "Avg Response", "Last Success",
        "Error Rate", "Features", "Chains",
    ]);
    for exchange in exchanges {
        let rate_tone = ErrorRateTone::of(exchange).tone();
        t.add_row(vec![
            comfy_table::Cell::new(&exchange.name),
            if exchange.is_active {
                toned("Active", Tone::Positive)
            } else {
                toned("Inactive", Tone::Negative)
            },
            comfy_table::Cell::new(exchange.exchange_type.as_str()),
            comfy_table::Cell::new(format!("{}/min", exchange.rate_limit_per_minute)),
            comfy_table::Cell::new(format_number(exchange.total_requests as f64, 0)),
            comfy_table::Cell::new(format!(
                "{} ({} consecutive)",
                exchange.total_errors, exchange.consecutive_errors
            )),
            comfy_table::Cell::new(average_response(exchange)),
            comfy_table::Cell::new(
                exchange
                    .last_successful_request
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |at| format_time_ago(at, now)),
            ),
            toned(
                format!(
                    "{} {}",
                    format_percentage(exchange.error_rate_percent(), 2),
                    text_bar(exchange.error_rate_percent(), 100.0, BAR_WIDTH)
                )
                .trim_end(),
                rate_tone,
            ),
            comfy_table::Cell::new(features(exchange)),
            comfy_table::Cell::new(first_of(&exchange.supported_chains, VISIBLE_CHAINS, true)),
        ]);
    }
    t
}

fn average_response(exchange: &Exchange) -> String {
    match exchange.average_response_time_ms {
        Some(ms) if ms.is_finite() && ms > 0.0 => format!("{:.0}ms", ms),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn features(exchange: &Exchange) -> String {
    let mut list = Vec::new();
    if exchange.supports_historical_data {
        list.push("Historical");
    }
    if exchange.supports_websocket {
        list.push("WebSocket");
    }
    list.join(", ")
}
