//! Rebalab CLI — comparison runs, volatility, and candle scan commands.
//!
//! Commands:
//! - `run` — compare rebalance periods against hold-only and buy-and-hold,
//!   from a TOML config file or from flags
//! - `volatility` — average EW volatility per symbol and for the
//!   equal-weight portfolio
//! - `candles` — largest red-candle spans for one symbol

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

use rebalab_core::analysis::{
    average_ewm_std, average_ewm_volatility, equal_weight_returns, largest_red_candles,
    log_returns, RedCandle,
};
use rebalab_core::data::{build_price_table, read_symbol_csv, resample};
use rebalab_core::domain::Candle;
use rebalab_core::schedule::Period;
use rebalab_runner::dataset::find_symbol_file;
use rebalab_runner::{run_from_config, ArtifactManager, Dataset, RunConfig, Summary};

#[derive(Parser)]
#[command(
    name = "rebalab",
    about = "Rebalab CLI — periodic rebalancing backtest lab"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare rebalance periods against hold-only and per-symbol baselines.
    Run {
        /// Path to a TOML config file (mutually exclusive with the tuning flags).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to include (e.g., BTCUSDT ETHUSDT).
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to the data's start.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD, inclusive). Defaults to the data's end.
        #[arg(long)]
        end: Option<String>,

        /// Rebalance periods to compare. Defaults to 1D,1W.
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        periods: Option<Vec<String>>,

        /// Proportional fee per trade. Defaults to 0.001.
        #[arg(long)]
        fee: Option<f64>,

        /// Initial capital. Defaults to 100000.
        #[arg(long)]
        capital: Option<f64>,

        /// Candle granularity the data is resampled to. Defaults to 1min.
        #[arg(long)]
        granularity: Option<String>,

        /// Directory holding one CSV export per symbol. Defaults to data/.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output directory for run artifacts. Defaults to runs/.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Narrate every allocation and trade (forces sequential runs).
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    /// Average EW volatility per symbol and for the equal-weight portfolio.
    Volatility {
        /// Symbols to analyze.
        #[arg(required = true)]
        symbols: Vec<String>,

        /// EW span in periods.
        #[arg(long, default_value_t = 30)]
        span: usize,

        /// Candle granularity returns are computed on.
        #[arg(long, default_value = "1D")]
        granularity: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        end: Option<String>,

        /// Directory holding one CSV export per symbol.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Largest red-candle spans for one symbol.
    Candles {
        /// Symbol to scan.
        #[arg(required = true)]
        symbol: String,

        /// Number of candles to show per ranking.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Candle granularity the scan runs on.
        #[arg(long, default_value = "1D")]
        granularity: String,

        /// Directory holding one CSV export per symbol.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbols,
            start,
            end,
            periods,
            fee,
            capital,
            granularity,
            data_dir,
            output_dir,
            verbose,
        } => run_cmd(
            config, symbols, start, end, periods, fee, capital, granularity, data_dir,
            output_dir, verbose,
        ),
        Commands::Volatility {
            symbols,
            span,
            granularity,
            start,
            end,
            data_dir,
        } => volatility_cmd(symbols, span, &granularity, start, end, &data_dir),
        Commands::Candles {
            symbol,
            top,
            granularity,
            data_dir,
        } => candles_cmd(&symbol, top, &granularity, &data_dir),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    config_path: Option<PathBuf>,
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    periods: Option<Vec<String>>,
    fee: Option<f64>,
    capital: Option<f64>,
    granularity: Option<String>,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    // A config file carries the full run description; no flag overrides.
    if config_path.is_some() {
        let overrides = [
            ("--symbols", !symbols.is_empty()),
            ("--start", start.is_some()),
            ("--end", end.is_some()),
            ("--periods", periods.is_some()),
            ("--fee", fee.is_some()),
            ("--capital", capital.is_some()),
            ("--granularity", granularity.is_some()),
            ("--data-dir", data_dir.is_some()),
            ("--output-dir", output_dir.is_some()),
        ];
        if let Some((flag, _)) = overrides.iter().find(|(_, passed)| *passed) {
            bail!("--config and {flag} are mutually exclusive");
        }
    } else if symbols.is_empty() {
        bail!("one of --config or --symbols is required");
    }

    let config = if let Some(path) = config_path {
        RunConfig::from_toml_file(&path)?
    } else {
        let defaults = RunConfig::default();
        RunConfig {
            symbols,
            start_date: parse_date(start.as_deref())?,
            end_date: parse_date(end.as_deref())?,
            periods: periods.unwrap_or(defaults.periods),
            fee_rate: fee.unwrap_or(defaults.fee_rate),
            initial_capital: capital.unwrap_or(defaults.initial_capital),
            granularity: granularity.unwrap_or(defaults.granularity),
            data_dir: data_dir.unwrap_or(defaults.data_dir),
            output_dir: output_dir.unwrap_or(defaults.output_dir),
        }
    };

    let (dataset, outcome) = run_from_config(&config, verbose)?;

    for (scenario, err) in &outcome.failures {
        eprintln!("Error for {}: {err}", scenario.label());
    }
    if outcome.is_empty() {
        bail!("every scenario failed");
    }

    let summary = Summary::from_batch(&outcome);
    print_summary(&dataset, &summary);

    let manager = ArtifactManager::new(&config.output_dir)?;
    let paths = manager.save_batch(&config, &dataset, &outcome)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

fn volatility_cmd(
    symbols: Vec<String>,
    span: usize,
    granularity: &str,
    start: Option<String>,
    end: Option<String>,
    data_dir: &std::path::Path,
) -> Result<()> {
    let period = Period::parse(granularity)?;
    let start_date = parse_date(start.as_deref())?;
    let end_date = parse_date(end.as_deref())?;

    let mut series: HashMap<String, Vec<Candle>> = HashMap::new();
    let mut rows: Vec<(String, usize, Option<f64>)> = Vec::new();
    for symbol in &symbols {
        let path = find_symbol_file(data_dir, symbol)?;
        let candles = read_symbol_csv(&path)?;
        let candles = filter_range(resample(&candles, period), start_date, end_date);
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        rows.push((
            symbol.clone(),
            candles.len(),
            average_ewm_volatility(&closes, span),
        ));
        series.insert(symbol.clone(), candles);
    }

    // The equal-weight portfolio: the same measure over the mean of
    // per-symbol returns, on the timestamps every symbol covers.
    let table = build_price_table(&series, None, None)?;
    let per_symbol: Vec<Vec<f64>> = table
        .symbols()
        .iter()
        .map(|symbol| log_returns(table.column(symbol).unwrap_or(&[])))
        .collect();
    let merged = equal_weight_returns(&per_symbol);
    rows.push((
        "portfolio".to_string(),
        table.len(),
        average_ewm_std(&merged, span),
    ));

    // Calmest first.
    rows.sort_by(|a, b| match (a.2, b.2) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    println!("{:<10} {:>8} {:>12}", "Symbol", "Candles", "Avg EW Vol %");
    println!("{}", "-".repeat(32));
    for (name, count, vol) in &rows {
        match vol {
            Some(v) => println!("{:<10} {:>8} {:>12.4}", name, count, v * 100.0),
            None => println!("{:<10} {:>8} {:>12}", name, count, "n/a"),
        }
    }

    Ok(())
}

fn candles_cmd(
    symbol: &str,
    top: usize,
    granularity: &str,
    data_dir: &std::path::Path,
) -> Result<()> {
    let period = Period::parse(granularity)?;
    let path = find_symbol_file(data_dir, symbol)?;
    let candles = resample(&read_symbol_csv(&path)?, period);
    let report = largest_red_candles(&candles, top);

    if report.by_close_low.is_empty() {
        println!("No red candles for {symbol}");
        return Ok(());
    }

    println!(
        "Top {} red candles with largest (Close - Low) difference for {symbol} ({granularity})",
        report.by_close_low.len()
    );
    print_candle_table(&report.by_close_low, |c| (c.close_low_diff, c.close_low_pct));

    println!();
    println!(
        "Top {} red candles with largest (High - Low) difference for {symbol} ({granularity})",
        report.by_high_low.len()
    );
    print_candle_table(&report.by_high_low, |c| (c.high_low_diff, c.high_low_pct));

    Ok(())
}

fn print_candle_table(rows: &[RedCandle], metric: impl Fn(&RedCandle) -> (f64, f64)) {
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8}",
        "Timestamp", "Open", "High", "Low", "Close", "Diff", "Pct"
    );
    println!("{}", "-".repeat(84));
    for candle in rows {
        let (diff, pct) = metric(candle);
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>8.2}",
            candle.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            diff,
            pct
        );
    }
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
    })
    .transpose()
}

/// Keep candles inside the inclusive [start, end] date range.
fn filter_range(
    candles: Vec<Candle>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Candle> {
    let lo: Option<DateTime<Utc>> = start.map(|d| d.and_time(NaiveTime::MIN).and_utc());
    let hi: Option<DateTime<Utc>> = end
        .map(|d| d.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1));
    candles
        .into_iter()
        .filter(|c| {
            lo.map_or(true, |s| c.timestamp >= s) && hi.map_or(true, |e| c.timestamp <= e)
        })
        .collect()
}

fn print_summary(dataset: &Dataset, summary: &Summary) {
    println!();
    println!("=== Rebalance Comparison ===");
    println!("Symbols:        {}", dataset.table.symbols().join(", "));
    println!("Rows:           {}", dataset.table.len());
    if let (Some(first), Some(last)) = (
        dataset.table.timestamps().first(),
        dataset.table.timestamps().last(),
    ) {
        println!("Range:          {first} to {last}");
    }
    println!("Dataset hash:   {}", &dataset.hash[..16.min(dataset.hash.len())]);
    println!();
    print!("{summary}");
    println!();
    if let Some(best) = summary.best() {
        println!("Best: {} ({:+.2}%)", best.scenario, best.return_pct);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
