//! Flashtrade CLI - Drive the practice-trading core from the command line.
//!
//! Every command prints a JSON `ApiResponse` envelope on stdout. Logs go to
//! stderr and are filtered with `RUST_LOG`.

use clap::{Parser, Subcommand, ValueEnum};
use flashtrade_core::{
    calculate_pnl,
    format::{
        format_currency, format_duration, format_large_number, format_percentage,
        format_time_remaining,
    },
    get_module, list_modules,
    market::{get_asset, TRADING_ASSETS},
    validate_trade_input, ApiResponse, FlashConfig, HistorySummary, LearningProgress,
    SessionType, TradeSide, TradingDesk,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "flashtrade")]
#[command(about = "Flashtrade CLI - practice flash trading with virtual currency")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.flashtrade/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config,
    /// Show the asset catalog and seed quotes
    Market,
    /// Check a trade against balance and position limits
    Validate {
        /// Units to trade
        #[arg(short, long)]
        quantity: String,
        /// Price per unit
        #[arg(short, long)]
        price: String,
        /// Available balance
        #[arg(short, long, default_value = "10000")]
        balance: f64,
        /// Maximum position as a fraction of balance
        #[arg(short, long, default_value = "0.1")]
        max_position: f64,
    },
    /// Compute profit/loss for a closed position
    Pnl {
        #[arg(long)]
        entry: f64,
        #[arg(long)]
        exit: f64,
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long, value_enum, default_value = "buy")]
        side: Side,
    },
    /// Skill module commands
    Modules {
        #[command(subcommand)]
        action: ModulesAction,
    },
    /// Run a timed practice session with market orders
    Simulate {
        /// Session preset
        #[arg(short = 't', long, value_enum, default_value = "practice")]
        session_type: Kind,
        /// Seconds of simulated market time
        #[arg(short, long, default_value = "10")]
        seconds: u64,
        /// Orders as SIDE:SYMBOL:QUANTITY, placed at session start
        #[arg(short, long)]
        order: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ModulesAction {
    /// List modules with their state
    List {
        /// Completed module IDs (comma-separated)
        #[arg(short, long, default_value = "")]
        completed: String,
    },
    /// Get module details
    Get {
        /// Module ID
        #[arg(short, long)]
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Buy,
    Sell,
}

impl From<Side> for TradeSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => TradeSide::Buy,
            Side::Sell => TradeSide::Sell,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Practice,
    Tutorial,
    Challenge,
}

impl From<Kind> for SessionType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Practice => SessionType::Practice,
            Kind::Tutorial => SessionType::Tutorial,
            Kind::Challenge => SessionType::Challenge,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FlashConfig::load_from_path(path),
        None => FlashConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => return print(&ApiResponse::<()>::err(e.to_string())),
    };

    match cli.command {
        Commands::Config => print(&ApiResponse::ok(&config)),
        Commands::Market => handle_market(&config),
        Commands::Validate {
            quantity,
            price,
            balance,
            max_position,
        } => handle_validate(&quantity, &price, balance, max_position),
        Commands::Pnl {
            entry,
            exit,
            quantity,
            side,
        } => print(&ApiResponse::ok(json!({
            "pnl": calculate_pnl(entry, exit, quantity, side.into()),
        }))),
        Commands::Modules { action } => handle_modules(action),
        Commands::Simulate {
            session_type,
            seconds,
            order,
        } => handle_simulate(&config, session_type.into(), seconds, &order).await,
    }
}

fn print<T: Serialize>(response: &ApiResponse<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

fn handle_market(config: &FlashConfig) -> anyhow::Result<()> {
    let desk = TradingDesk::new(config);
    print(&ApiResponse::ok(json!({
        "assets": TRADING_ASSETS,
        "quotes": desk.quotes(),
    })))
}

fn handle_validate(
    quantity: &str,
    price: &str,
    balance: f64,
    max_position: f64,
) -> anyhow::Result<()> {
    let (validation, _) = validate_trade_input(quantity, price, balance, max_position);
    match validation.reason {
        None => print(&ApiResponse::ok(validation)),
        Some(reason) => print(&ApiResponse::<()>::err(reason.to_string())),
    }
}

fn handle_modules(action: ModulesAction) -> anyhow::Result<()> {
    match action {
        ModulesAction::List { completed } => {
            let mut progress = LearningProgress::new();
            for id in completed.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if let Err(e) = progress.complete(id) {
                    return print(&ApiResponse::<()>::err(e.to_string()));
                }
            }

            let modules: Vec<_> = list_modules()
                .into_iter()
                .map(|m| {
                    let state = progress.module_state(&m);
                    json!({ "module": m, "state": state })
                })
                .collect();
            print(&ApiResponse::ok(json!({
                "modules": modules,
                "progress_percent": progress.progress_percent(),
            })))
        }
        ModulesAction::Get { id } => match get_module(&id) {
            Some(module) => print(&ApiResponse::ok(module)),
            None => print(&ApiResponse::<()>::err(format!("Module not found: {}", id))),
        },
    }
}

fn parse_order(order: &str) -> Option<(TradeSide, String, f64)> {
    let mut parts = order.split(':');
    let side = match parts.next()?.to_lowercase().as_str() {
        "buy" => TradeSide::Buy,
        "sell" => TradeSide::Sell,
        _ => return None,
    };
    let symbol = get_asset(parts.next()?)?.symbol.to_string();
    let quantity = parts.next()?.parse().ok()?;
    Some((side, symbol, quantity))
}

async fn handle_simulate(
    config: &FlashConfig,
    session_type: SessionType,
    seconds: u64,
    orders: &[String],
) -> anyhow::Result<()> {
    let mut desk = TradingDesk::new(config);
    if let Err(e) = desk.start(session_type) {
        return print(&ApiResponse::<()>::err(e.to_string()));
    }

    let mut rejected = Vec::new();
    for order in orders {
        let result = match parse_order(order) {
            Some((side, symbol, quantity)) => desk
                .submit_market_order(&symbol, side, quantity)
                .map_err(|e| e.to_string()),
            None => Err(format!("Unrecognized order: {}", order)),
        };
        if let Err(reason) = result {
            tracing::warn!("{}: {}", order, reason);
            rejected.push(json!({ "order": order, "reason": reason }));
        }
    }

    tokio::time::sleep(Duration::from_secs(seconds)).await;
    desk.pause()?;

    let now = chrono::Utc::now();
    let (length, remaining) = match (desk.session().session(), desk.session().preset()) {
        (Some(session), Some(preset)) => (
            format_duration(preset.duration_minutes),
            format_time_remaining(session.start_time + preset.duration(), now),
        ),
        _ => (format_duration(0), format_time_remaining(now, now)),
    };

    let open: Vec<_> = desk
        .session()
        .session()
        .map(|s| s.open_trades().map(|t| t.trade_id.clone()).collect::<Vec<_>>())
        .unwrap_or_default();
    for trade_id in open {
        desk.close_trade(&trade_id, "session end")?;
    }

    let session = desk.complete(now)?.clone();
    let quotes = desk.quotes();
    let board: Vec<_> = quotes
        .values()
        .map(|q| {
            json!({
                "symbol": q.symbol,
                "price": format_currency(q.price),
                "change": format_percentage(q.change_percent),
                "volume": format_large_number(q.volume),
            })
        })
        .collect();
    let history = HistorySummary::from_trades(desk.trades());

    print(&ApiResponse::ok(json!({
        "session": session,
        "session_length": length,
        "time_remaining": remaining,
        "balance": format_currency(desk.balance()),
        "total_pnl": format_currency(history.total_pnl),
        "board": board,
        "quotes": quotes,
        "history": history,
        "rejected": rejected,
    })))
}
