//! Tradedesk CLI - Console front-end for a simulated trading session.
//!
//! Every command starts a fresh seeded session (nothing is persisted) and
//! prints a JSON envelope on stdout. Logs go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tradedesk_core::{
    assistant::{Assistant, GeminiClient},
    ledger::estimated_cost,
    spawn_price_feed, ApiResponse, DashboardConfig, SharedSession, TradeOrder, TradeSide,
    TradingSession,
};

#[derive(Parser)]
#[command(name = "tradedesk")]
#[command(about = "Simulated stock and commodity trading desk")]
#[command(version)]
struct Cli {
    /// Config file (defaults to TRADEDESK_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Seed for the price feed, for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List quoted assets
    Market,
    /// Run the price feed and report the portfolio afterwards
    Simulate {
        /// Number of feed ticks to run
        #[arg(short, long, default_value = "5")]
        ticks: u64,
        /// Milliseconds between ticks (overrides config)
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// Orders placed at market before the run, as side:ticker:quantity
        #[arg(short, long = "order")]
        orders: Vec<String>,
    },
    /// Execute a single trade against the seeded portfolio
    Trade {
        /// buy or sell
        #[arg(short, long)]
        side: String,
        /// Ticker symbol
        #[arg(short, long)]
        ticker: String,
        /// Units to trade
        #[arg(short = 'n', long)]
        quantity: f64,
        /// Price per unit (defaults to the feed price)
        #[arg(short, long)]
        price: Option<f64>,
    },
    /// Ask the assistant to analyze the seeded portfolio
    Analyze,
    /// Ask the assistant for smart alerts
    Alerts,
    /// Ask the assistant for assets matching a query
    Search {
        /// What to look for, e.g. "inflation hedges"
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load_from_path(path),
        None => DashboardConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            println!("{}", render(&ApiResponse::<()>::err(e.to_string())));
            return Ok(());
        }
    };

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let session = TradingSession::from_config(&config, &mut rng);
    tracing::debug!("Session {} started", session.id);

    let output = match cli.command {
        Commands::Market => render(&ApiResponse::ok(json!({ "assets": session.assets() }))),
        Commands::Simulate {
            ticks,
            interval_ms,
            orders,
        } => {
            let period = interval_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or_else(|| config.tick_interval());
            handle_simulate(session, rng, ticks, period, &orders).await
        }
        Commands::Trade {
            side,
            ticker,
            quantity,
            price,
        } => handle_trade(session, &side, &ticker, quantity, price),
        Commands::Analyze => {
            let assistant = assistant(&config)?;
            let analysis = assistant.analyze_portfolio(&session.snapshot()).await;
            render(&ApiResponse::ok(json!({ "analysis": analysis })))
        }
        Commands::Alerts => {
            let assistant = assistant(&config)?;
            render(&ApiResponse::ok(json!({ "alerts": assistant.smart_alerts().await })))
        }
        Commands::Search { query } => {
            let assistant = assistant(&config)?;
            match assistant.search_assets(&query).await {
                Ok(results) => render(&ApiResponse::ok(json!({ "results": results }))),
                Err(e) => render(&ApiResponse::<()>::err(e.to_string())),
            }
        }
    };

    println!("{}", output);
    Ok(())
}

fn assistant(config: &DashboardConfig) -> Result<Assistant<GeminiClient>> {
    Ok(Assistant::new(GeminiClient::from_config(&config.assistant)?))
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!("{{\"ok\":false,\"error\":\"{}\"}}", e))
}

/// Parse `side:ticker:quantity`.
fn parse_order(spec: &str) -> Result<(TradeSide, String, f64), String> {
    let parts: Vec<&str> = spec.split(':').collect();
    let [side, ticker, quantity] = parts.as_slice() else {
        return Err(format!("Expected side:ticker:quantity, got '{}'", spec));
    };
    let side: TradeSide = side.parse().map_err(|e: tradedesk_core::Error| e.to_string())?;
    let quantity: f64 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("Invalid quantity in '{}'", spec))?;
    Ok((side, ticker.trim().to_string(), quantity))
}

async fn handle_simulate(
    session: TradingSession,
    rng: StdRng,
    ticks: u64,
    period: std::time::Duration,
    orders: &[String],
) -> String {
    let shared = SharedSession::new(session);

    let mut executed = Vec::new();
    let mut rejected = Vec::new();
    for spec in orders {
        let outcome = parse_order(spec).and_then(|(side, ticker, quantity)| {
            shared
                .market_order(&ticker, quantity, side)
                .map_err(|e| e.to_string())
        });
        match outcome {
            Ok(trade) => executed.push(trade),
            Err(error) => rejected.push(json!({ "order": spec, "error": error })),
        }
    }

    let handle = match spawn_price_feed(shared.clone(), period, rng) {
        Ok(handle) => handle,
        Err(e) => return render(&ApiResponse::<()>::err(e.to_string())),
    };
    let mut updates = handle.subscribe();
    while updates.borrow().sequence < ticks {
        if updates.changed().await.is_err() {
            break;
        }
        let update = updates.borrow_and_update().clone();
        let valuation = shared.valuation();
        tracing::info!(
            "Tick {}: total value ${:.2}, P&L ${:.2} ({:.2}%)",
            update.sequence,
            valuation.total_value,
            valuation.total_pnl,
            valuation.total_pnl_percent
        );
    }

    let ticks_run = match handle.stop().await {
        Ok(count) => count,
        Err(e) => return render(&ApiResponse::<()>::err(e.to_string())),
    };

    let report = shared.report();
    render(&ApiResponse::ok(json!({
        "ticks": ticks_run,
        "valuation": report,
        "weights": report.weights(),
        "executed": executed,
        "rejected": rejected,
        "trades": shared.trades(),
    })))
}

fn handle_trade(
    mut session: TradingSession,
    side: &str,
    ticker: &str,
    quantity: f64,
    price: Option<f64>,
) -> String {
    let side: TradeSide = match side.parse() {
        Ok(side) => side,
        Err(e) => return render(&ApiResponse::<()>::err(e.to_string())),
    };

    let result = match price {
        Some(price) => session.execute(&TradeOrder::new(ticker, quantity, price, side)),
        None => session.market_order(ticker, quantity, side),
    };

    match result {
        Ok(trade) => render(&ApiResponse::ok(json!({
            "trade": trade,
            "estimated_cost": estimated_cost(trade.quantity, trade.price),
            "cash": session.portfolio().cash,
            "holdings": session.portfolio().holdings,
            "valuation": session.valuation(),
        }))),
        Err(rejection) => render(&ApiResponse::<()>::err(rejection.to_string())),
    }
}
