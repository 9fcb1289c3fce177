use crate::context::ViewContext;
use crate::render::{heading, pager, push_line, push_table, table, toned};
use crate::state::ListState;
use core_types::{
    MultiExchangeFilters, MultiExchangeOpportunity, Opportunity, OpportunityClass, OpportunityFilters,
    Paginated, Priority, RiskLevel,
};
use formatting::{
    NOT_AVAILABLE, Tone, format_currency, format_date, format_duration, format_percentage,
};
use query_cache::{QueryKey, QueryState};

pub struct OpportunitiesData {
    pub list: ListState<OpportunityFilters>,
    pub opportunities: QueryState<Paginated<Opportunity>>,
    pub multi_exchange: QueryState<Paginated<MultiExchangeOpportunity>>,
}

/// The list state the page opens with: first page, newest first.
pub fn initial_state(ctx: &ViewContext) -> ListState<OpportunityFilters> {
    ListState::new(ctx.pagination().opportunities_page_size, OpportunityFilters::newest_first())
}

/// Loads the current page of opportunities and the multi-exchange leaders.
///
/// `previous` is the state of the page shown before; its data stays visible
/// while the new page has nothing to show yet.
pub async fn load(
    ctx: &ViewContext,
    list: &ListState<OpportunityFilters>,
    previous: Option<&QueryState<Paginated<Opportunity>>>,
) -> OpportunitiesData {
    let (page, page_size) = (list.page(), list.page_size());
    let filters = list.filters().clone();
    let key = QueryKey::new("opportunities").with(&page).with(&page_size).with(&filters);
    let top = ctx.pagination().multi_exchange_limit;

    let (opportunities, multi_exchange) = tokio::join!(
        ctx.query(key, ctx.refresh().opportunities_secs, move |api| async move {
            api.opportunities(page, page_size, &filters).await
        }),
        ctx.query(
            QueryKey::new("multi-exchange-opportunities").with(&top),
            ctx.refresh().opportunities_secs,
            move |api| async move {
                api.multi_exchange_opportunities(1, top, &MultiExchangeFilters::default())
                    .await
            }
        ),
    );

    let opportunities = match previous {
        Some(previous) => opportunities.or_previous(previous),
        None => opportunities,
    };
    OpportunitiesData {
        list: list.clone(),
        opportunities,
        multi_exchange,
    }
}

pub fn render(data: &OpportunitiesData) -> String {
    let mut out = String::new();
    heading(&mut out, "Opportunities");

    heading(&mut out, "Multi-Exchange Opportunities");
    if let Some(message) = &data.multi_exchange.error {
        push_line(&mut out, crate::render::error_line("multi-exchange opportunities", message));
    }
    match data.multi_exchange.data() {
        Some(page) if !page.items.is_empty() => push_table(&mut out, &multi_exchange_table(&page.items)),
        Some(_) => push_line(&mut out, "No multi-exchange opportunities"),
        None if data.multi_exchange.is_loading => push_line(&mut out, "Loading..."),
        None => {}
    }

    push_line(&mut out, format!("\nFilters: {}", describe_filters(data.list.filters())));

    if let Some(message) = &data.opportunities.error {
        push_line(&mut out, crate::render::error_line("opportunities", message));
    }
    let Some(page) = data.opportunities.data() else {
        if data.opportunities.is_loading {
            push_line(&mut out, "Loading...");
        }
        return out;
    };

    heading(&mut out, &format!("Individual Opportunities ({})", page.total));
    if page.items.is_empty() {
        push_line(&mut out, "No opportunities match the current filters");
    } else {
        push_table(&mut out, &opportunity_table(&page.items));
    }
    if let Some(pager) = pager(page, data.list.page()) {
        push_line(&mut out, pager);
    }
    out
}

fn multi_exchange_table(items: &[MultiExchangeOpportunity]) -> comfy_table::Table {
    let mut t = table(&["Priority", "Token", "Best Return", "Opportunities", "Exchanges"]);
    for item in items {
        t.add_row(vec![
            toned(item.priority.as_str(), priority_tone(item.priority)),
            comfy_table::Cell::new(display_name(item)),
            comfy_table::Cell::new(format_percentage(item.best_overall_return, 2)),
            comfy_table::Cell::new(item.total_opportunities),
            comfy_table::Cell::new(item.supported_exchanges.len()),
        ]);
    }
    t
}

fn opportunity_table(items: &[Opportunity]) -> comfy_table::Table {
    let mut t = table(&[
        "Token", "Class", "Return", "Net", "Capital", "Risk", "Exchanges", "Duration", "Status", "Created",
    ]);
    for item in items {
        t.add_row(vec![
            comfy_table::Cell::new(item.token_symbol.as_deref().unwrap_or("Unknown Token")),
            comfy_table::Cell::new(class_label(item.opportunity_class)),
            comfy_table::Cell::new(format_percentage(item.estimated_return_percent, 2)),
            comfy_table::Cell::new(
                item.net_return_percent
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |net| format_percentage(net, 2)),
            ),
            comfy_table::Cell::new(format_currency(item.capital_required_usd, 2)),
            toned(item.risk_level.as_str(), risk_tone(item.risk_level)),
            comfy_table::Cell::new(item.source_exchanges.join(", ")),
            comfy_table::Cell::new(format_duration(item.duration_hours)),
            if item.is_executed {
                toned("Executed", Tone::Positive)
            } else {
                toned("Pending", Tone::Neutral)
            },
            comfy_table::Cell::new(format_date(&item.created_at)),
        ]);
    }
    t
}

/// `MULTI_EXCHANGE_ARBITRAGE` → `MULTI EXCHANGE ARBITRAGE`.
pub fn class_label(class: OpportunityClass) -> String {
    class.as_str().replace('_', " ")
}

pub fn risk_tone(risk: RiskLevel) -> Tone {
    match risk {
        RiskLevel::Low => Tone::Positive,
        RiskLevel::Medium => Tone::Neutral,
        RiskLevel::High | RiskLevel::VeryHigh => Tone::Negative,
    }
}

pub fn priority_tone(priority: Priority) -> Tone {
    match priority {
        Priority::High => Tone::Negative,
        Priority::Medium | Priority::Low => Tone::Neutral,
    }
}

fn display_name(item: &MultiExchangeOpportunity) -> String {
    if item.name.is_empty() || item.name == item.symbol {
        item.symbol.clone()
    } else {
        format!("{} ({})", item.name, item.symbol)
    }
}

/// One-line summary of the active filters, `none` when nothing narrows the list.
pub fn describe_filters(filters: &OpportunityFilters) -> String {
    let mut parts = Vec::new();
    if let Some(symbol) = &filters.token_symbol {
        parts.push(format!("token={}", symbol));
    }
    if let Some(class) = filters.opportunity_class {
        parts.push(format!("class={}", class.label()));
    }
    if let Some(risk) = filters.risk_level {
        parts.push(format!("risk={}", risk));
    }
    if let Some(min) = filters.min_return {
        parts.push(format!("min return={}", format_percentage(min, 2)));
    }
    if filters.is_executed == Some(true) {
        parts.push("executed only".to_string());
    }
    let filter_text = if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    };
    match &filters.sort_by {
        Some(field) => format!(
            "{} (sorted by {} {})",
            filter_text,
            field,
            if filters.sort_desc == Some(false) { "asc" } else { "desc" }
        ),
        None => filter_text,
    }
}
