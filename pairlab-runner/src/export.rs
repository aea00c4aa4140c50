//! Reporting and export: JSON, CSV, and terminal report generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: daily series and trade tape for external analysis tools
//! - **Text**: the terminal summary printed by `pairlab run`
//!
//! Undefined values (NaN) are written as `null` in JSON and as empty cells in CSV.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::runner::{DailyRecord, PairBacktestResult, TradeRecord, SCHEMA_VERSION};

/// Serialize a result to pretty JSON.
pub fn export_json(result: &PairBacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize PairBacktestResult to JSON")
}

/// Deserialize a result from JSON, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<PairBacktestResult> {
    let result: PairBacktestResult =
        serde_json::from_str(json).context("failed to deserialize PairBacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

fn cell(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.8}")
    } else {
        String::new()
    }
}

fn opt_cell(value: Option<f64>) -> String {
    value.map(cell).unwrap_or_default()
}

/// Daily series as CSV, one row per aligned date.
pub fn export_daily_csv(daily: &[DailyRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "close_a",
        "close_b",
        "spread",
        "rolling_mean",
        "rolling_std",
        "signal",
        "executed",
        "return_a",
        "return_b",
        "strategy_return",
        "adjusted_return",
        "cumulative",
        "adjusted_cumulative",
    ])?;
    for row in daily {
        wtr.write_record([
            row.date.to_string(),
            cell(row.close_a),
            cell(row.close_b),
            cell(row.spread),
            opt_cell(row.rolling_mean),
            opt_cell(row.rolling_std),
            row.signal.as_i8().to_string(),
            row.executed.as_i8().to_string(),
            cell(row.return_a),
            cell(row.return_b),
            cell(row.strategy_return),
            cell(row.adjusted_return),
            cell(row.cumulative),
            cell(row.adjusted_cumulative),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Trade tape as CSV.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "side",
        "entry_index",
        "entry_date",
        "exit_index",
        "exit_date",
        "days_held",
        "cumulative_return",
        "status",
    ])?;
    for t in trades {
        wtr.write_record([
            format!("{:?}", t.side),
            t.entry_index.to_string(),
            t.entry_date.to_string(),
            t.exit_index.map(|i| i.to_string()).unwrap_or_default(),
            t.exit_date.map(|d| d.to_string()).unwrap_or_default(),
            t.days_held.to_string(),
            format!("{:.6}", t.cumulative_return),
            format!("{:?}", t.status),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Save the artifact set for one run.
///
/// Creates `{A}_{B}_{timestamp}/` under `output_dir` containing
/// `manifest.json` (the full result), `daily.csv`, and `trades.csv`.
/// Returns the created directory.
pub fn save_artifacts(result: &PairBacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}_{}",
        result.symbol_a,
        result.symbol_b,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(result)?)?;
    std::fs::write(run_dir.join("daily.csv"), export_daily_csv(&result.daily)?)?;
    std::fs::write(run_dir.join("trades.csv"), export_trades_csv(&result.trades)?)?;

    Ok(run_dir)
}

/// Load a result from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<PairBacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

fn fmt_num(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.precision$}")
    }
}

/// Terminal report: ADF result, then Sharpe ratio and maximum drawdown for
/// the raw and stop-loss-adjusted strategies.
pub fn render_report(result: &PairBacktestResult) -> String {
    let mut out = String::with_capacity(1024);
    let _ = writeln!(
        out,
        "Pair {} / {}  {} to {}  ({} dates)",
        result.symbol_a, result.symbol_b, result.start_date, result.end_date, result.observations
    );
    if result.has_synthetic {
        let _ = writeln!(out, "Data: SYNTHETIC");
    }
    let _ = writeln!(
        out,
        "Hedge ratio: {}  Intercept: {}  R^2: {}",
        fmt_num(result.spread.hedge_ratio, 4),
        fmt_num(result.spread.intercept, 4),
        fmt_num(result.spread.r_squared, 4)
    );
    let _ = writeln!(out);

    match &result.adf {
        Some(adf) => {
            let _ = writeln!(out, "ADF Statistic: {}", fmt_num(adf.statistic, 4));
            let _ = writeln!(out, "p-value: {}", fmt_num(adf.p_value, 4));
            let _ = writeln!(
                out,
                "Critical values: 1%: {:.3}  5%: {:.3}  10%: {:.3}  (lags: {})",
                adf.critical_values.one_pct,
                adf.critical_values.five_pct,
                adf.critical_values.ten_pct,
                adf.used_lag
            );
        }
        None => {
            let _ = writeln!(out, "ADF Statistic: n/a");
            let _ = writeln!(out, "p-value: n/a");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Sharpe Ratio: {}",
        fmt_num(result.performance.annualized_sharpe, 4)
    );
    let _ = writeln!(
        out,
        "Maximum Drawdown: {}",
        fmt_num(result.performance.max_drawdown, 4)
    );
    let _ = writeln!(
        out,
        "Sharpe Ratio with stop-loss: {}",
        fmt_num(result.adjusted_performance.annualized_sharpe, 4)
    );
    let _ = writeln!(
        out,
        "Maximum Drawdown with stop-loss: {}",
        fmt_num(result.adjusted_performance.max_drawdown, 4)
    );
    let _ = writeln!(
        out,
        "Trades: {}  Stop-loss exits: {}  Win rate: {}",
        result.trades.len(),
        result.stop_loss_exits,
        fmt_num(result.win_rate, 3)
    );

    for warning in &result.warnings {
        let _ = writeln!(out, "Warning: {warning}");
    }
    out
}
