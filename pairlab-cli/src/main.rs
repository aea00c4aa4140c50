//! PairLab CLI: download, run, and cache commands.
//!
//! Commands:
//! - `download`: fetch daily closes from Yahoo Finance and cache as Parquet
//! - `run`: execute a pair backtest from a TOML config file or flags
//! - `cache status`: report cached symbols and their date ranges

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pairlab_core::data::{
    CoverageResult, CsvProvider, DataProvider, ParquetCache, YahooProvider,
};
use pairlab_runner::{
    render_report, run_single_backtest, save_artifacts, ConfigOverrides, LoadOptions, PairConfig,
};

const DEFAULT_SYMBOL_A: &str = "KO";
const DEFAULT_SYMBOL_B: &str = "PEP";
const DEFAULT_START: &str = "2018-01-01";
const DEFAULT_END: &str = "2023-01-01";

#[derive(Parser)]
#[command(
    name = "pairlab",
    about = "PairLab CLI: pairs-trading backtests with a stop-loss overlay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily closes from Yahoo Finance and cache as Parquet.
    Download {
        /// Symbols to download (e.g., KO PEP).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long, default_value = DEFAULT_START)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long, default_value = DEFAULT_END)]
        end: String,

        /// Download again even if the cache covers the range.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache directory.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Run a pair backtest from a TOML config file or flags.
    Run(RunArgs),
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to a TOML config file. Mutually exclusive with the pair flags;
    /// the range and strategy flags override its entries.
    #[arg(long)]
    config: Option<PathBuf>,

    /// First leg (the dependent variable of the hedge regression).
    #[arg(long)]
    a: Option<String>,

    /// Second leg.
    #[arg(long)]
    b: Option<String>,

    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Rolling window length.
    #[arg(long)]
    window: Option<usize>,

    /// Band width in rolling standard deviations.
    #[arg(long)]
    threshold: Option<f64>,

    /// Trade stop-loss as a cumulative return, e.g. -0.02.
    #[arg(long, allow_hyphen_values = true)]
    stop_loss: Option<f64>,

    /// Offline mode: no network access.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Use synthetic data as fallback.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Read `{SYMBOL}.csv` files from this directory instead of Yahoo Finance.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Cache directory.
    #[arg(long, default_value = "data")]
    cache_dir: PathBuf,

    /// Output directory for run artifacts.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Print the report only; write no artifacts.
    #[arg(long, default_value_t = false)]
    no_artifacts: bool,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached symbols, date ranges, and bar counts.
    Status {
        /// Symbols to check. Defaults to every cached symbol.
        symbols: Vec<String>,

        /// Cache directory.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            symbols,
            start,
            end,
            force,
            cache_dir,
        } => run_download(&symbols, &start, &end, force, &cache_dir),
        Commands::Run(args) => run_backtest_cmd(args),
        Commands::Cache { action } => match action {
            CacheAction::Status { symbols, cache_dir } => run_cache_status(&symbols, &cache_dir),
        },
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn run_download(
    symbols: &[String],
    start: &str,
    end: &str,
    force: bool,
    cache_dir: &Path,
) -> Result<()> {
    let start_date = parse_date(start)?;
    let end_date = parse_date(end)?;
    if start_date >= end_date {
        bail!("--start must be before --end");
    }

    let provider = YahooProvider::new()?;
    let cache = ParquetCache::new(cache_dir);
    let mut failures = Vec::new();

    for symbol in symbols {
        if !force && cache.covers_range(symbol, start_date, end_date) == CoverageResult::FullyCovered
        {
            println!("{symbol}: already cached");
            continue;
        }
        match provider.fetch(symbol, start_date, end_date) {
            Ok(fetched) => {
                let meta = cache.write(&fetched.series, fetched.source)?;
                println!(
                    "{symbol}: {} bars, {} to {}",
                    meta.bar_count, meta.start_date, meta.end_date
                );
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "download failed");
                failures.push(format!("{symbol}: {e}"));
            }
        }
    }

    if !failures.is_empty() {
        bail!("{} of {} downloads failed:\n{}", failures.len(), symbols.len(), failures.join("\n"));
    }
    Ok(())
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    let pair_flags = args.a.is_some() || args.b.is_some();
    if args.config.is_some() && pair_flags {
        bail!("--config and --a/--b are mutually exclusive");
    }

    let config = match &args.config {
        Some(path) => PairConfig::from_file(path)?.with_overrides(&overrides_from_flags(&args)?)?,
        None => build_config_from_flags(&args)?,
    };

    let opts = LoadOptions {
        start: config.pair.start_date,
        end: config.pair.end_date,
        offline: args.offline,
        synthetic: args.synthetic,
        force: false,
    };

    let cache = ParquetCache::new(&args.cache_dir);
    let provider: Option<Box<dyn DataProvider>> = match (&args.csv_dir, args.offline) {
        (Some(dir), _) => Some(Box::new(CsvProvider::new(dir))),
        (None, true) => None,
        (None, false) => Some(Box::new(YahooProvider::new()?)),
    };

    info!(
        a = %config.pair.symbol_a,
        b = %config.pair.symbol_b,
        run_id = %config.run_id(),
        "starting backtest"
    );
    let result = run_single_backtest(&config, &cache, provider.as_deref(), &opts)?;

    println!("{}", render_report(&result));

    if !args.no_artifacts {
        let run_dir = save_artifacts(&result, &args.output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

/// Range and strategy flags that take precedence over a config file.
fn overrides_from_flags(args: &RunArgs) -> Result<ConfigOverrides> {
    Ok(ConfigOverrides {
        start_date: args.start.as_deref().map(parse_date).transpose()?,
        end_date: args.end.as_deref().map(parse_date).transpose()?,
        window: args.window,
        threshold: args.threshold,
        stop_loss_threshold: args.stop_loss,
    })
}

/// Build a config from flags, routed through the same TOML path as a file.
fn build_config_from_flags(args: &RunArgs) -> Result<PairConfig> {
    let symbol_a = args.a.as_deref().unwrap_or(DEFAULT_SYMBOL_A);
    let symbol_b = args.b.as_deref().unwrap_or(DEFAULT_SYMBOL_B);
    let start = args.start.as_deref().unwrap_or(DEFAULT_START);
    let end = args.end.as_deref().unwrap_or(DEFAULT_END);
    parse_date(start)?;
    parse_date(end)?;

    let mut strategy = Vec::new();
    if let Some(window) = args.window {
        strategy.push(format!("window = {window}"));
    }
    if let Some(threshold) = args.threshold {
        strategy.push(format!("threshold = {threshold:?}"));
    }
    if let Some(stop_loss) = args.stop_loss {
        strategy.push(format!("stop_loss_threshold = {stop_loss:?}"));
    }

    let toml_str = format!(
        r#"[pair]
symbol_a = "{symbol_a}"
symbol_b = "{symbol_b}"
start_date = "{start}"
end_date = "{end}"

[strategy]
{}
"#,
        strategy.join("\n")
    );

    Ok(PairConfig::from_toml(&toml_str)?)
}

fn run_cache_status(symbols: &[String], cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = ParquetCache::new(cache_dir);
    let listed: Vec<String> = if symbols.is_empty() {
        cache.cached_symbols()
    } else {
        symbols.to_vec()
    };
    if listed.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let refs: Vec<&str> = listed.iter().map(String::as_str).collect();
    println!("Cache: {}", cache_dir.display());
    println!();
    println!("{:<8} {:<25} {:>10}", "Symbol", "Date Range", "Bars");
    println!("{}", "-".repeat(45));
    for status in cache.status(&refs) {
        let (range, bars) = match (status.start_date, status.end_date, status.bar_count) {
            (Some(s), Some(e), Some(n)) => (format!("{s} to {e}"), n.to_string()),
            _ => ("(not cached)".to_string(), "-".to_string()),
        };
        println!("{:<8} {:<25} {:>10}", status.symbol, range, bars);
    }

    Ok(())
}
