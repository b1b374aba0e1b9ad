use std::env;
use std::path::PathBuf;

use agilecost_core::{pipeline, report, ConfigFlags, RunConfig};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Agile tariff cost of half-hourly consumption", long_about = None)]
struct Cli {
    /// Consumption CSV (timestamp, kWh) [env: AGILECOST_USAGE_CSV]
    #[arg(long)]
    usage: Option<PathBuf>,
    /// Agile rates CSV (period from, period to, import p/kWh, export p/kWh) [env: AGILECOST_PRICES_CSV]
    #[arg(long)]
    prices: Option<PathBuf>,
    /// First slot start, 'YYYY-MM-DD HH:MM' UTC or RFC 3339 [env: AGILECOST_START]
    #[arg(long)]
    start: Option<String>,
    /// Exclusive bound on slot starts [env: AGILECOST_END]
    #[arg(long)]
    end: Option<String>,
    /// TOML schedule of flat tariff periods to compare against [env: AGILECOST_FLAT_TARIFF]
    #[arg(long)]
    flat_tariff: Option<PathBuf>,
    /// Print only the summary, not one line per slot
    #[arg(long)]
    summary_only: bool,
    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = resolve_config(&cli)?;
    info!(
        usage = %config.usage_csv.display(),
        prices = %config.prices_csv.display(),
        slots = config.window.slot_count(),
        "Starting cost run"
    );

    let inputs = pipeline::Inputs::load(&config).context("failed to load input data")?;

    if let Some((key, record)) = inputs.usage.first() {
        println!("{}", report::first_usage_line(key, record));
    }
    if let Some((key, record)) = inputs.prices.first() {
        println!("{}", report::first_price_line(key, record));
    }

    let cost = pipeline::evaluate(&inputs, &config).context("cost run aborted")?;

    if !cli.summary_only {
        for line in cost.reconciliation.slots.iter().filter_map(report::slot_line) {
            println!("{line}");
        }
    }
    if let Some(line) = report::missing_periods_line(&cost.reconciliation) {
        println!("{line}");
    }

    println!("\n{}", report::summary(&cost.reconciliation));
    if let Some(flat) = &cost.flat {
        println!("\n{}", report::flat_comparison(flat));
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let flags = ConfigFlags {
        usage_csv: cli.usage.clone(),
        prices_csv: cli.prices.clone(),
        start: cli.start.clone(),
        end: cli.end.clone(),
        flat_tariff: cli.flat_tariff.clone(),
    };
    RunConfig::resolve(flags, |key| env::var(key).ok()).context("invalid configuration")
}
