//! Offline tooling for the sweep detector and mean-reversion strategy.
//!
//! - `backtest`: replay a tick recording through detector and strategy
//! - `analyze`: forward-return statistics of detected sweeps
//! - `generate-config` / `validate-config`: TOML config management

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use sweep_core::analysis::{self, AnalysisReport, ReturnSummary};
use sweep_core::backtest::{BacktestReport, Backtester};
use sweep_core::io;
use sweep_core::{init_logging, AppConfig, LogFormat, MeanReversionStrategy, SweepModel};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "sweep_core")]
#[command(version, about = "Liquidity sweep detection and mean-reversion replay", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "sweep_core.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SWEEP_CORE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay ticks through the detector and strategy
    Backtest {
        /// CSV with columns ts,price,volume,side[B/S]
        #[arg(long, default_value = "ticks_eth.csv")]
        ticks: PathBuf,

        /// Only replay the first N ticks (0 = all)
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detect sweeps and summarize forward returns per direction
    Analyze {
        /// CSV with columns ts,price,volume,side[B/S]
        #[arg(long, default_value = "ticks_eth.csv")]
        ticks: PathBuf,

        /// Override the forward horizon in seconds
        #[arg(long)]
        horizon: Option<f64>,

        /// Also write the detected sweeps to this CSV
        #[arg(long)]
        sweeps_out: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "sweep_core.toml")]
        output: PathBuf,
    },
    /// Validate config without running
    ValidateConfig,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_level = cli.log_level.as_deref();
    let log_format = cli.log_format.as_deref();

    match cli.command {
        Commands::GenerateConfig { output } => generate_sample_config(&output),
        Commands::ValidateConfig => {
            let config = load_config(&cli.config, log_format)?;
            println!("Configuration is valid:\n{:#?}", config);
            Ok(())
        }
        Commands::Backtest { ticks, limit, json } => {
            let config = load_config(&cli.config, log_format)?;
            let _guard = init_logging(&config.logging, log_level)?;
            run_backtest(&config, &ticks, limit, json)
        }
        Commands::Analyze {
            ticks,
            horizon,
            sweeps_out,
            json,
        } => {
            let config = load_config(&cli.config, log_format)?;
            let _guard = init_logging(&config.logging, log_level)?;
            run_analysis(&config, &ticks, horizon, sweeps_out.as_deref(), json)
        }
    }
}

/// Load the config file (defaults when absent), apply CLI overrides and validate.
fn load_config(path: &Path, log_format: Option<&str>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(path)?;
    if let Some(format) = log_format {
        config.logging.format = format.parse::<LogFormat>()?;
    }
    config.validate()?;
    Ok(config)
}

fn run_backtest(
    config: &AppConfig,
    ticks_path: &Path,
    limit: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticks = io::load_ticks(ticks_path)?;
    if limit > 0 {
        ticks.truncate(limit);
    }
    info!(path = %ticks_path.display(), ticks = ticks.len(), "starting backtest");

    let mut backtester = Backtester::new(
        SweepModel::from_config(&config.sweep)?,
        MeanReversionStrategy::from_config(&config.strategy)?,
    );
    let report = backtester.run(&ticks);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_backtest_report(&report, ticks_path, limit);
    }
    Ok(())
}

fn run_analysis(
    config: &AppConfig,
    ticks_path: &Path,
    horizon: Option<f64>,
    sweeps_out: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut analysis_config = config.analysis.clone();
    if let Some(horizon) = horizon {
        analysis_config.horizon_sec = horizon;
    }
    analysis_config.validate()?;

    let ticks = io::load_ticks_sorted(ticks_path)?;
    let mut model = SweepModel::from_config(&config.sweep)?;
    let sweeps = analysis::collect_sweeps(&mut model, &ticks);
    info!(ticks = ticks.len(), sweeps = sweeps.len(), "sweeps generated");

    if let Some(path) = sweeps_out {
        io::write_sweeps(path, &sweeps)?;
        info!(path = %path.display(), "sweeps written");
    }

    let outcomes = analysis::forward_outcomes(&ticks, &sweeps, analysis_config.horizon_sec);
    let report = analysis::summarize(&outcomes);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_analysis_report(&report, analysis_config.horizon_sec);
    }
    Ok(())
}

fn print_backtest_report(report: &BacktestReport, ticks_path: &Path, limit: usize) {
    let replayed = if limit > 0 {
        limit.to_string()
    } else {
        "all".to_string()
    };
    println!("Replayed ticks: {} from {}", replayed, ticks_path.display());
    println!("Sweeps detected: {}", report.sweeps);
    println!("Opens: {}, Closes: {}", report.opens, report.closes);
    println!(
        "Wins: {}, Losses: {}, WinRate: {:4.1}%",
        report.wins,
        report.losses,
        report.win_rate()
    );
    println!("Cum PnL (mark): {:.6}", report.cum_pnl);
}

fn print_analysis_report(report: &AnalysisReport, horizon_sec: f64) {
    println!(
        "Down sweeps: {}, Up sweeps: {} ({}s horizon)\n",
        report.down_count, report.up_count, horizon_sec
    );
    print_summary("Down sweep", report.down.as_ref());
    print_summary("Up sweep", report.up.as_ref());
}

fn print_summary(label: &str, summary: Option<&ReturnSummary>) {
    let Some(s) = summary else {
        println!("No {} events found\n", label.to_lowercase());
        return;
    };
    println!("{label}: count={}", s.count);
    println!("{label}: mean={:.6}", s.mean);
    println!("{label}: std ={:.6}", s.std);
    println!("{label}: median={:.6}", s.median);
    println!("{label}: 5%={:.6}, 95%={:.6}\n", s.p5, s.p95);
}

fn generate_sample_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = AppConfig::default().to_toml_string()?;

    let with_comments = format!(
        r#"# Sweep detector / strategy configuration
# See: cargo run --bin sweep_core -- --help
#
# Logging can also be controlled per component with RUST_LOG, e.g.
# RUST_LOG=info,sweep_core::sweep=debug

{}"#,
        content
    );

    std::fs::write(path, with_comments)?;
    println!("Sample config written to: {}", path.display());
    Ok(())
}
