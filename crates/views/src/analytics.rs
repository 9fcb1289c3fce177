use crate::context::ViewContext;
use crate::error::ViewError;
use crate::render::{heading, push_line, push_table, table, text_bar, toned};
use crate::status::PageStatus;
use core_types::{
    AnalyticsOverview, ChartDataPoint, ExchangePairReport, TokenPerformanceReport,
};
use comfy_table::Cell;
use formatting::{
    NOT_AVAILABLE, format_currency, format_date_short, format_decimal, format_percentage,
    percentage_tone,
};
use query_cache::{QueryKey, QueryState};
use std::fmt;

const DETAIL_ROWS: usize = 5;
const CHART_WIDTH: usize = 30;

/// Look-back window of the analytics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyticsWindow {
    Week,
    #[default]
    Month,
    Quarter,
}

impl AnalyticsWindow {
    pub const ALL: [AnalyticsWindow; 3] = [AnalyticsWindow::Week, AnalyticsWindow::Month, AnalyticsWindow::Quarter];

    pub fn days(self) -> u32 {
        match self {
            AnalyticsWindow::Week => 7,
            AnalyticsWindow::Month => 30,
            AnalyticsWindow::Quarter => 90,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalyticsWindow::Week => "Last 7 days",
            AnalyticsWindow::Month => "Last 30 days",
            AnalyticsWindow::Quarter => "Last 90 days",
        }
    }
}

impl TryFrom<u32> for AnalyticsWindow {
    type Error = ViewError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|w| w.days() == days)
            .ok_or(ViewError::InvalidTimeRange(days))
    }
}

impl fmt::Display for AnalyticsWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct AnalyticsData {
    pub window: AnalyticsWindow,
    pub overview: QueryState<AnalyticsOverview>,
    pub tokens: QueryState<TokenPerformanceReport>,
    pub pairs: QueryState<ExchangePairReport>,
}

impl AnalyticsData {
    pub fn status(&self) -> PageStatus {
        PageStatus::default()
            .track("analytics overview", &self.overview)
            .track("token performance", &self.tokens)
            .track("exchange pairs", &self.pairs)
    }
}

pub async fn load(ctx: &ViewContext, window: AnalyticsWindow) -> AnalyticsData {
    let days = window.days();
    let limit = ctx.pagination().analytics_limit;
    let every = ctx.refresh().analytics_secs;

    let (overview, tokens, pairs) = tokio::join!(
        ctx.query(QueryKey::new("analytics-overview").with(&days), every, move |api| async move {
            api.analytics_overview(days).await
        }),
        ctx.query(
            QueryKey::new("token-performance").with(&days).with(&limit),
            every,
            move |api| async move { api.token_performance(days, limit).await }
        ),
        ctx.query(
            QueryKey::new("exchange-pairs").with(&days).with(&limit),
            every,
            move |api| async move { api.exchange_pair_analytics(days, limit).await }
        ),
    );

    AnalyticsData {
        window,
        overview,
        tokens,
        pairs,
    }
}

/// `binance→kraken` → `binance → kraken`.
pub fn pair_display_name(pair_name: &str) -> String {
    pair_name.replace('→', " → ")
}

/// Opportunity counts per token, in backend order.
pub fn token_opportunity_series(report: &TokenPerformanceReport) -> Vec<ChartDataPoint> {
    report
        .tokens
        .iter()
        .map(|t| ChartDataPoint {
            name: t.symbol.clone(),
            value: t.total_opportunities as f64,
            timestamp: None,
        })
        .collect()
}

pub fn token_return_series(report: &TokenPerformanceReport) -> Vec<ChartDataPoint> {
    report
        .tokens
        .iter()
        .map(|t| ChartDataPoint {
            name: t.symbol.clone(),
            value: t.average_return,
            timestamp: None,
        })
        .collect()
}

pub fn pair_opportunity_series(report: &ExchangePairReport) -> Vec<ChartDataPoint> {
    report
        .exchange_pairs
        .iter()
        .map(|p| ChartDataPoint {
            name: pair_display_name(&p.pair_name),
            value: p.total_opportunities as f64,
            timestamp: None,
        })
        .collect()
}

pub fn pair_success_series(report: &ExchangePairReport) -> Vec<ChartDataPoint> {
    report
        .exchange_pairs
        .iter()
        .map(|p| ChartDataPoint {
            name: pair_display_name(&p.pair_name),
            value: p.success_rate,
            timestamp: None,
        })
        .collect()
}

pub fn render(data: &AnalyticsData) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Analytics ({})", data.window));
    let status = data.status();
    if status.is_loading {
        push_line(&mut out, "Loading...");
        return out;
    }
    for line in status.error_lines() {
        push_line(&mut out, line);
    }

    if let Some(overview) = data.overview.data() {
        let mut cards = table(&["Total Opportunities", "Executed", "Avg Return", "Unique Tokens"]);
        let average = overview.opportunities.average_return;
        cards.add_row(vec![
            Cell::new(overview.opportunities.total),
            Cell::new(overview.opportunities.executed),
            toned(format_percentage(average, 2), percentage_tone(average)),
            Cell::new(overview.tokens.unique_count),
        ]);
        push_table(&mut out, &cards);
        let day = |date: Option<chrono::NaiveDate>| {
            date.map_or_else(
                || NOT_AVAILABLE.to_string(),
                |d| format_date_short(&d.and_time(chrono::NaiveTime::MIN).and_utc()),
            )
        };
        push_line(
            &mut out,
            format!(
                "{} to {}",
                day(overview.time_range.start()),
                day(overview.time_range.end())
            ),
        );
    }

    if let Some(report) = data.tokens.data() {
        heading(&mut out, "Top Tokens by Opportunities");
        chart(&mut out, &token_opportunity_series(report), |v| format_decimal(v, 0));
        heading(&mut out, "Average Return by Token");
        chart(&mut out, &token_return_series(report), |v| format_percentage(v, 2));

        heading(&mut out, "Token Performance Details");
        let mut details = table(&["Token", "Avg Return", "Opportunities", "Max Return", "Volume"]);
        for token in report.tokens.iter().take(DETAIL_ROWS) {
            details.add_row(vec![
                token.symbol.clone(),
                format_percentage(token.average_return, 2),
                format!("{} opportunities", token.total_opportunities),
                format_percentage(token.max_return, 2),
                format_currency(token.total_volume_usd, 2),
            ]);
        }
        push_table(&mut out, &details);
    }

    if let Some(report) = data.pairs.data() {
        heading(&mut out, "Top Exchange Pairs");
        chart(&mut out, &pair_opportunity_series(report), |v| format_decimal(v, 0));
        heading(&mut out, "Success Rate by Pair");
        chart(&mut out, &pair_success_series(report), |v| format_percentage(v, 2));

        heading(&mut out, "Exchange Pair Details");
        let mut details = table(&["Pair", "Avg Return", "Opportunities", "Success", "Max Return"]);
        for pair in report.exchange_pairs.iter().take(DETAIL_ROWS) {
            details.add_row(vec![
                pair_display_name(&pair.pair_name),
                format_percentage(pair.average_return, 2),
                format!("{} opportunities", pair.total_opportunities),
                format_percentage(pair.success_rate, 2),
                format_percentage(pair.max_return, 2),
            ]);
        }
        push_table(&mut out, &details);
    }
    out
}

/// Renders a series as labelled horizontal bars.
fn chart(out: &mut String, series: &[ChartDataPoint], format_value: impl Fn(f64) -> String) {
    if series.is_empty() {
        push_line(out, "No data for this period");
        return;
    }
    let max = series.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let label_width = series.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
    for point in series {
        push_line(
            out,
            format!(
                "{:<width$}  {:<bar$}  {}",
                point.name,
                text_bar(point.value, max, CHART_WIDTH),
                format_value(point.value),
                width = label_width,
                bar = CHART_WIDTH
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ExchangePairAnalytics, TokenPerformance};

    #[test]
    fn windows_accept_only_known_ranges() {
        assert_eq!(AnalyticsWindow::try_from(7), Ok(AnalyticsWindow::Week));
        assert_eq!(AnalyticsWindow::try_from(90), Ok(AnalyticsWindow::Quarter));
        assert_eq!(AnalyticsWindow::try_from(14), Err(ViewError::InvalidTimeRange(14)));
        assert_eq!(AnalyticsWindow::default().days(), 30);
    }

    #[test]
    fn pair_names_get_spaced_arrows() {
        assert_eq!(pair_display_name("binance→kraken"), "binance → kraken");
        assert_eq!(pair_display_name("okx-bybit"), "okx-bybit");
    }

    #[test]
    fn series_follow_backend_order() {
        let report = TokenPerformanceReport {
            tokens: vec![
                TokenPerformance {
                    symbol: "ETH".into(),
                    total_opportunities: 12,
                    average_return: 2.5,
                    max_return: 7.0,
                    total_volume_usd: 1.0e6,
                },
                TokenPerformance {
                    symbol: "BTC".into(),
                    total_opportunities: 30,
                    average_return: 1.1,
                    max_return: 3.0,
                    total_volume_usd: 4.0e6,
                },
            ],
            total_tokens: 2,
        };
        let series = token_opportunity_series(&report);
        assert_eq!(series[0].name, "ETH");
        assert_eq!(series[1].value, 30.0);

        let pairs = ExchangePairReport {
            exchange_pairs: vec![ExchangePairAnalytics {
                pair_name: "binance→kraken".into(),
                total_opportunities: 4,
                average_return: 1.0,
                max_return: 2.0,
                success_rate: 75.0,
            }],
            total_pairs: 1,
        };
        assert_eq!(pair_success_series(&pairs)[0].name, "binance → kraken");
    }

    #[test]
    fn charts_scale_bars_to_the_largest_value() {
        let mut out = String::new();
        let series = vec![
            ChartDataPoint { name: "A".into(), value: 10.0, timestamp: None },
            ChartDataPoint { name: "BB".into(), value: 5.0, timestamp: None },
        ];
        chart(&mut out, &series, |v| format_decimal(v, 0));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0].matches('█').count(), CHART_WIDTH);
        assert_eq!(lines[1].matches('█').count(), CHART_WIDTH / 2);
        assert!(lines[1].starts_with("BB"));
    }
}
