//! Bandwatch CLI: daily price updates, watchlist import, and reports.
//!
//! Commands:
//! - `update` runs one daily update cycle
//! - `import` reconciles the tracked set against a watchlist CSV
//! - `report` prints the daily watch report
//! - `panel` prints per-instrument price panels as JSON
//! - `reset` rolls back today's update state

mod config;
mod main_lib;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use bandwatch_core::overview::{build_panels, TimePeriod};
use bandwatch_core::reports::compose_daily_report;
use bandwatch_core::watchlist::parse_watchlist;

use config::Config;
use main_lib::{build_state, init_tracing, AppState};

#[derive(Parser)]
#[command(name = "bandwatch", about = "Buy/sell band tracking for a watchlist of instruments")]
struct Cli {
    /// Run as of this date (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    date: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one daily update cycle: backfill, refresh, weekly snapshot, grooming.
    Update,
    /// Reconcile the tracked set against a watchlist CSV.
    Import {
        /// Path to the watchlist CSV (name, symbol, buy_price, sell_price, ignore).
        file: PathBuf,
    },
    /// Print the daily watch report.
    Report,
    /// Print per-instrument price panels as JSON.
    Panel {
        /// Display period: 1day, 30days, 3months, 1year, 3years, 5years.
        #[arg(long, default_value = "30days")]
        period: String,

        /// Limit the output to one tracked symbol.
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Roll back today's update state so the daily cycle can run again.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing();

    let today = match cli.date.as_deref() {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date {value}"))?,
        None => Local::now().date_naive(),
    };

    let state = build_state(&config).await?;

    match cli.command {
        Commands::Update => run_update(&state, today).await,
        Commands::Import { file } => run_import(&state, &file, today).await,
        Commands::Report => run_report(&state),
        Commands::Panel { period, symbol } => {
            run_panel(&state, &period, symbol.as_deref(), today)
        }
        Commands::Reset => run_reset(&state, today).await,
    }
}

async fn run_update(state: &AppState, today: NaiveDate) -> Result<()> {
    let summary = state.update_service.run_daily_update(today).await?;

    println!("{}", summary.summary());
    if summary.backfilled > 0 {
        println!("Backfilled full history for {} instruments", summary.backfilled);
    }
    if summary.groomed {
        println!("History grooming ran");
    }

    for (symbol, message) in &summary.errors {
        eprintln!("Error for {symbol}: {message}");
    }
    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_import(state: &AppState, file: &Path, today: NaiveDate) -> Result<()> {
    let reader = File::open(file)
        .with_context(|| format!("Cannot open watchlist {}", file.display()))?;
    let entries = parse_watchlist(reader)?;
    println!("Parsed {} watchlist entries from {}", entries.len(), file.display());

    let summary = state.update_service.reconcile_watchlist(entries, today).await?;

    println!("{}", summary.summary());
    if summary.backfilled > 0 {
        println!("Backfilled full history for {} instruments", summary.backfilled);
    }
    if !summary.backfill_complete {
        println!("Some instruments are still waiting on their full history");
    }

    for (symbol, message) in &summary.errors {
        eprintln!("Error for {symbol}: {message}");
    }
    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_report(state: &AppState) -> Result<()> {
    state.update_service.load_instruments()?;
    let instruments = state.update_service.instruments();

    match compose_daily_report(&instruments) {
        Some(report) => {
            println!("{}", report.subject);
            println!();
            println!("{}", report.body);
        }
        None => println!("Nothing to report."),
    }
    Ok(())
}

fn run_panel(state: &AppState, period: &str, symbol: Option<&str>, today: NaiveDate) -> Result<()> {
    state.update_service.load_instruments()?;
    let mut instruments = state.update_service.instruments();

    if let Some(wanted) = symbol {
        let wanted = wanted.to_uppercase();
        instruments.retain(|i| i.symbol == wanted);
        if instruments.is_empty() {
            bail!("{wanted} is not tracked");
        }
    }

    let period = TimePeriod::parse(period);
    let panels = build_panels(
        state.history_repository.as_ref(),
        &instruments,
        period,
        today,
    )?;
    println!("{}", serde_json::to_string_pretty(&panels)?);
    Ok(())
}

async fn run_reset(state: &AppState, today: NaiveDate) -> Result<()> {
    let summary = state.update_service.reset_daily_state(today).await?;
    println!("{}", summary.summary());
    Ok(())
}
