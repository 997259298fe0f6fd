//! ZoneLab CLI: analyze instruments from a directory of CSV candles.
//!
//! Commands:
//! - `analyze`: run the full pipeline for one or more instruments
//! - `scan`: analyze every instrument found in the data directory
//! - `presets`: list the named configuration presets
//! - `config`: print the effective configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zonelab_core::data::CsvCandleSource;
use zonelab_core::pipeline::AnalysisResult;
use zonelab_core::signal::SignalKind;
use zonelab_core::{analyze, analyze_many, AnalysisConfig, ConfigPreset};

#[derive(Parser)]
#[command(
    name = "zonelab",
    about = "ZoneLab CLI: multi-timeframe FX entry signal analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more instruments from CSV candle files.
    Analyze {
        /// Instruments to analyze (e.g., EUR_USD USD_JPY).
        #[arg(required = true)]
        instruments: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Analyze every instrument with candle files in the data directory.
    Scan {
        #[command(flatten)]
        common: CommonArgs,

        /// Only report instruments whose signal is directional.
        #[arg(long, default_value_t = false)]
        signals_only: bool,
    },
    /// List the named configuration presets.
    Presets,
    /// Print the effective configuration as TOML.
    Config {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Named preset: original, conservative, aggressive, balanced.
        #[arg(long)]
        preset: Option<String>,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Directory holding `<INSTRUMENT>_<GRANULARITY>.csv` files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named preset: original, conservative, aggressive, balanced.
    #[arg(long)]
    preset: Option<String>,

    /// Emit JSON instead of the text report.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            instruments,
            common,
        } => run_analyze(&instruments, &common),
        Commands::Scan {
            common,
            signals_only,
        } => run_scan(&common, signals_only),
        Commands::Presets => {
            run_presets();
            Ok(())
        }
        Commands::Config { config, preset } => {
            let config = resolve_config(config.as_deref(), preset.as_deref())?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("zonelab=info,zonelab_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `--config` and `--preset` are mutually exclusive; neither means defaults.
fn resolve_config(path: Option<&Path>, preset: Option<&str>) -> Result<AnalysisConfig> {
    match (path, preset) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (Some(path), None) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        (None, Some(name)) => {
            let preset: ConfigPreset = name.parse().with_context(|| {
                format!("unknown preset '{name}'. Valid: original, conservative, aggressive, balanced")
            })?;
            Ok(preset.to_config())
        }
        (None, None) => Ok(AnalysisConfig::default()),
    }
}

fn run_analyze(instruments: &[String], common: &CommonArgs) -> Result<()> {
    let config = resolve_config(common.config.as_deref(), common.preset.as_deref())?;
    let source = CsvCandleSource::new(&common.data_dir);

    let mut results = Vec::with_capacity(instruments.len());
    for instrument in instruments {
        let result = analyze(instrument, &source, &config)
            .with_context(|| format!("analyzing {instrument}"))?;
        results.push(result);
    }

    if common.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            print_report(result);
        }
    }
    Ok(())
}

fn run_scan(common: &CommonArgs, signals_only: bool) -> Result<()> {
    let config = resolve_config(common.config.as_deref(), common.preset.as_deref())?;
    let source = CsvCandleSource::new(&common.data_dir);
    let instruments = source
        .instruments()
        .with_context(|| format!("listing instruments in {}", common.data_dir.display()))?;

    if instruments.is_empty() {
        println!("No candle files found in {}", common.data_dir.display());
        return Ok(());
    }

    info!(count = instruments.len(), dir = %common.data_dir.display(), "scanning");
    let mut results = Vec::with_capacity(instruments.len());
    for (instrument, outcome) in analyze_many(&instruments, &source, &config) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => warn!(%instrument, error = %e, "analysis failed"),
        }
    }
    if signals_only {
        results.retain(|r| r.signal.signal != SignalKind::NoSignal);
    }

    if common.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_scan_table(&results);
    }
    Ok(())
}

fn run_presets() {
    println!("{:<14} Description", "Preset");
    println!("{}", "-".repeat(72));
    for preset in ConfigPreset::ALL {
        println!("{:<14} {}", preset.as_str(), preset.description());
    }
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{p:.5}"),
        None => "-".into(),
    }
}

fn print_scan_table(results: &[AnalysisResult]) {
    println!(
        "{:<10} {:<15} {:>6} {:<18} {:<10} {:>10}",
        "Instrument", "Signal", "Conf", "Trend", "Status", "Price"
    );
    println!("{}", "-".repeat(74));
    for r in results {
        println!(
            "{:<10} {:<15} {:>6} {:<18} {:<10} {:>10}",
            r.instrument,
            r.signal.signal.to_string(),
            r.signal.confidence.to_string(),
            format!("{} {}", r.trend.bias, r.trend.strength),
            r.status.to_string(),
            format_price(r.signal.entry_price),
        );
    }
}

fn print_report(result: &AnalysisResult) {
    println!();
    println!("=== {} ===", result.instrument);
    println!("Status:         {}", result.status);
    println!("Config:         {}", result.config_hash.short());
    println!("Price:          {}", format_price(result.signal.entry_price));
    println!();
    println!("--- Signal ---");
    println!("Signal:         {}", result.signal.signal);
    println!("Confidence:     {}", result.signal.confidence);
    println!("Trend aligned:  {}", result.signal.trend_alignment);
    let score = &result.signal.score;
    println!(
        "Score:          {} (price action {}, zones {}, trend {}, volume {})",
        score.total(),
        score.price_action,
        score.zones,
        score.trend,
        score.volume
    );
    if let Some(reason) = &result.signal.suppressed {
        println!("Suppressed:     {reason}");
    }
    if let Some(rr) = &result.signal.risk_reward {
        println!(
            "Stop / Target:  {:.5} / {:.5}",
            rr.stop_loss(),
            rr.take_profit()
        );
        println!(
            "Risk / Reward:  {:.1} / {:.1} pips (1:{:.2})",
            rr.risk_pips(),
            rr.reward_pips(),
            rr.ratio()
        );
    }
    println!();
    println!("--- Trend ({}) ---", result.trend.method);
    println!(
        "Bias:           {} {} ({})",
        result.trend.bias, result.trend.strength, result.trend.confidence
    );
    if let Some(reason) = &result.trend.degraded {
        println!("Degraded:       {reason}");
    }
    println!();
    println!("--- Zones ---");
    if result.zones.is_empty() {
        println!("(none)");
    }
    for zone in &result.zones {
        let active = result
            .signal
            .entry_price
            .is_some_and(|price| zone.is_active(price));
        println!(
            "{:<16} {:.5} - {:.5} ({:.1} pips){}",
            zone.name().to_string(),
            zone.lower(),
            zone.upper(),
            zone.width_pips(),
            if active { "  ACTIVE" } else { "" }
        );
    }
    println!();
    println!("--- Price Action ({}) ---", result.price_action.method);
    println!(
        "Signal:         {} ({})",
        result.price_action.signal, result.price_action.confidence
    );
    for pattern in &result.price_action.patterns {
        println!("  {} {}: {}", pattern.kind, pattern.direction, pattern.description);
    }
    println!();
    println!("--- Entry ({}) ---", result.entry_timing.method);
    println!(
        "Entry:          {} ({})",
        result.entry_timing.signal, result.entry_timing.confidence
    );
    println!("Reason:         {}", result.entry_timing.reason);
    for d in &result.degradations {
        println!("WARNING: {} stage degraded: {}", d.stage, d.reason);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_and_preset_are_exclusive() {
        let err = resolve_config(Some(Path::new("zonelab.toml")), Some("original")).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn preset_names_resolve() {
        for preset in ConfigPreset::ALL {
            let config = resolve_config(None, Some(preset.as_str())).unwrap();
            assert_eq!(config, preset.to_config());
        }
        assert!(resolve_config(None, Some("reckless")).is_err());
    }

    #[test]
    fn defaults_without_flags() {
        assert_eq!(resolve_config(None, None).unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = resolve_config(Some(Path::new("/nonexistent/zonelab.toml")), None).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/zonelab.toml"));
    }

    #[test]
    fn format_price_handles_missing() {
        assert_eq!(format_price(None), "-");
        assert_eq!(format_price(Some(1.1)), "1.10000");
    }
}
