use anyhow::Context;
use api_client::{DEFAULT_SEARCH_LIMIT, WiggleClient};
use clap::{Args, Parser, Subcommand};
use configuration::{Config, ConfigOverrides, load_config, logging};
use core_types::{
    Chain, ExchangeFilters, ExchangeType, Opportunity, OpportunityClass, OpportunityFilters,
    Paginated, RiskLevel, Token, TokenFilters,
};
use indicatif::{ProgressBar, ProgressStyle};
use query_cache::QueryState;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use views::{
    AnalyticsWindow, ViewContext, analytics, dashboard, detail, exchanges, opportunities, tokens,
};

/// The main entry point for the Wiggle dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Pick up WIGGLE__* overrides from a .env file when there is one.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply_overrides(&cli.overrides)
        .context("Invalid command-line override")?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&config);
    tracing::debug!(base_url = %config.api.base_url, "Starting Wiggle dashboard.");

    let client = WiggleClient::new(&config.api).context("Failed to build the API client")?;
    let ctx = ViewContext::new(Arc::new(client), config);

    if cli.watch {
        handle_watch(&ctx, &cli.command).await
    } else {
        let page = handle_command(&ctx, &cli.command, &mut PageMemory::default()).await?;
        println!("{}", page.text);
        Ok(if page.has_errors {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Read-only terminal dashboard for the Wiggle trading-opportunity backend.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./wiggle.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Keep the page open and refresh it on each query's polling interval.
    #[arg(long, global = true)]
    watch: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// System health, key metrics, 7-day summary and exchange health.
    Dashboard,
    /// Paged opportunity list plus the top multi-exchange opportunities.
    Opportunities(OpportunityArgs),
    /// A single opportunity by id.
    Opportunity { id: String },
    /// Paged token list.
    Tokens(TokenArgs),
    /// A single token by id.
    Token { id: String },
    /// Tokens whose symbol matches.
    SearchTokens {
        symbol: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    /// Exchange list with per-exchange error rates and the health summary.
    Exchanges(ExchangeArgs),
    /// A single exchange by id.
    Exchange { id: String },
    /// Overview, token performance and exchange-pair analytics.
    Analytics {
        /// Look-back window: 7, 30 or 90 days.
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Raw analysis history as returned by the backend.
    History {
        #[arg(long, default_value_t = 30)]
        days: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Backend liveness.
    Health {
        /// Include database statistics.
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Args)]
struct OpportunityArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    token_symbol: Option<String>,
    /// e.g. MULTI_EXCHANGE_ARBITRAGE, FEE_EXPLOITATION
    #[arg(long)]
    class: Option<OpportunityClass>,
    /// LOW, MEDIUM, HIGH or VERY_HIGH
    #[arg(long)]
    risk: Option<RiskLevel>,
    /// Minimum estimated return, in percent.
    #[arg(long)]
    min_return: Option<f64>,
    /// Only executed opportunities.
    #[arg(long)]
    executed: bool,
    #[arg(long, default_value = "created_at")]
    sort_by: String,
    #[arg(long)]
    ascending: bool,
}

impl OpportunityArgs {
    fn filters(&self) -> OpportunityFilters {
        OpportunityFilters {
            token_symbol: self.token_symbol.clone(),
            opportunity_class: self.class,
            risk_level: self.risk,
            min_return: self.min_return,
            is_executed: self.executed.then_some(true),
            sort_by: Some(self.sort_by.clone()),
            sort_desc: Some(!self.ascending),
        }
    }
}

#[derive(Args)]
struct TokenArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long)]
    symbol: Option<String>,
    /// ethereum, bitcoin, bsc or polygon
    #[arg(long)]
    chain: Option<Chain>,
    /// Only tokens that are no longer tracked.
    #[arg(long)]
    inactive_only: bool,
}

impl TokenArgs {
    fn filters(&self) -> TokenFilters {
        TokenFilters {
            symbol: self.symbol.clone(),
            chain: self.chain,
            is_active: self.inactive_only.then_some(false),
        }
    }
}

#[derive(Args)]
struct ExchangeArgs {
    /// CEX or DEX
    #[arg(long)]
    exchange_type: Option<ExchangeType>,
    #[arg(long)]
    active: Option<bool>,
}

impl ExchangeArgs {
    fn filters(&self) -> ExchangeFilters {
        ExchangeFilters {
            exchange_type: self.exchange_type,
            is_active: self.active,
        }
    }
}

// ==============================================================================
// Logging
// ==============================================================================

/// Console logs go through the indicatif writer so they do not tear the
/// loading spinners; a rolling file is added when a log directory is set.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let indicatif_layer = IndicatifLayer::new();
    let console = fmt::layer()
        .with_target(false)
        .with_writer(indicatif_layer.get_stderr_writer());

    let (file_layer, guard) = match logging::file_writer(&config.logging) {
        Some((writer, guard)) => (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(logging::env_filter(&config.logging))
        .with(console)
        .with(file_layer)
        .with(indicatif_layer)
        .init();
    guard
}

// ==============================================================================
// Page Rendering
// ==============================================================================

struct RenderedPage {
    text: String,
    has_errors: bool,
}

/// List states carried between watch-mode refreshes, so a list keeps its
/// previous rows while a new page is loading.
#[derive(Default)]
struct PageMemory {
    opportunities: Option<QueryState<Paginated<Opportunity>>>,
    tokens: Option<QueryState<Paginated<Token>>>,
}

/// Runs `load` inside a span that tracing-indicatif draws as a spinner.
async fn with_spinner<F: Future>(page: &'static str, load: F) -> F::Output {
    let span = tracing::info_span!("loading", page);
    span.pb_set_message(&format!("Loading {}...", page));
    load.instrument(span).await
}

async fn handle_command(
    ctx: &ViewContext,
    command: &Command,
    memory: &mut PageMemory,
) -> anyhow::Result<RenderedPage> {
    let now = chrono::Utc::now();
    let page = match command {
        Command::Dashboard => {
            let data = with_spinner("dashboard", dashboard::load(ctx)).await;
            RenderedPage {
                has_errors: data.status().has_errors(),
                text: dashboard::render(&data),
            }
        }
        Command::Opportunities(args) => {
            let mut list = opportunities::initial_state(ctx);
            list.set_filters(args.filters());
            list.set_page(args.page);
            let data = with_spinner(
                "opportunities",
                opportunities::load(ctx, &list, memory.opportunities.as_ref()),
            )
            .await;
            memory.opportunities = Some(data.opportunities.clone());
            RenderedPage {
                has_errors: data.opportunities.is_error() || data.multi_exchange.is_error(),
                text: opportunities::render(&data),
            }
        }
        Command::Opportunity { id } => {
            let state = with_spinner("opportunity", detail::load_opportunity(ctx, id)).await;
            RenderedPage {
                has_errors: state.is_error(),
                text: detail::render_opportunity(&state, now),
            }
        }
        Command::Tokens(args) => {
            let mut list = tokens::initial_state(ctx);
            list.set_filters(args.filters());
            list.set_page(args.page);
            let data = with_spinner("tokens", tokens::load(ctx, &list, memory.tokens.as_ref())).await;
            memory.tokens = Some(data.tokens.clone());
            RenderedPage {
                has_errors: data.tokens.is_error(),
                text: tokens::render(&data),
            }
        }
        Command::Token { id } => {
            let state = with_spinner("token", detail::load_token(ctx, id)).await;
            RenderedPage {
                has_errors: state.is_error(),
                text: detail::render_token(&state),
            }
        }
        Command::SearchTokens { symbol, limit } => {
            let state = with_spinner("token search", detail::load_search(ctx, symbol, *limit)).await;
            RenderedPage {
                has_errors: state.is_error(),
                text: detail::render_search(symbol, &state),
            }
        }
        Command::Exchanges(args) => {
            let data = with_spinner("exchanges", exchanges::load(ctx, &args.filters())).await;
            RenderedPage {
                has_errors: data.status().has_errors(),
                text: exchanges::render(&data, now),
            }
        }
        Command::Exchange { id } => {
            let state = with_spinner("exchange", detail::load_exchange(ctx, id)).await;
            RenderedPage {
                has_errors: state.is_error(),
                text: detail::render_exchange(&state, now),
            }
        }
        Command::Analytics { days } => {
            let window = AnalyticsWindow::try_from(*days).context("Invalid --days")?;
            let data = with_spinner("analytics", analytics::load(ctx, window)).await;
            RenderedPage {
                has_errors: data.status().has_errors(),
                text: analytics::render(&data),
            }
        }
        Command::History { days, limit } => {
            let state = with_spinner("analysis history", detail::load_history(ctx, *days, *limit)).await;
            RenderedPage {
                has_errors: state.is_error(),
                text: detail::render_history(&state),
            }
        }
        Command::Health { detailed } => {
            let state = with_spinner("health", detail::load_health(ctx, *detailed)).await;
            RenderedPage {
                has_errors: state.is_error(),
                text: detail::render_health(&state),
            }
        }
    };
    Ok(page)
}

// ==============================================================================
// Watch Mode
// ==============================================================================

/// Re-renders the page every watch tick until Ctrl-C. The query cache decides
/// which queries are actually due for a refetch on each tick.
async fn handle_watch(ctx: &ViewContext, command: &Command) -> anyhow::Result<ExitCode> {
    let tick = ctx.config.refresh.watch_tick();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut memory = PageMemory::default();

    let idle = ProgressBar::new_spinner();
    idle.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    idle.enable_steady_tick(Duration::from_millis(120));
    idle.set_message(format!("Refreshing every {}s, press Ctrl-C to quit", tick.as_secs()));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let page = handle_command(ctx, command, &mut memory).await?;
                let collected = ctx.cache.gc().await;
                let cached = ctx.cache.len().await;
                tracing::debug!(collected, cached, "Watch tick rendered.");
                idle.suspend(|| {
                    // Clear the screen and home the cursor before redrawing.
                    print!("\x1B[2J\x1B[H");
                    println!("{}", page.text);
                });
            }
            _ = tokio::signal::ctrl_c() => {
                idle.finish_and_clear();
                tracing::info!("Leaving watch mode.");
                return Ok(ExitCode::SUCCESS);
            }
        }
    }
}
