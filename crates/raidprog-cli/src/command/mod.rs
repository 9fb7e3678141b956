use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use raidprog_core::EngineConfig;

use self::{export::ExportArg, report::ReportArg};
use crate::util::{init_logging, read_json_file};

mod export;
mod report;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Engine configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print a text report for each session
    Report(#[clap(flatten)] ReportArg),
    /// Export summaries, progression series and throughput statistics as JSON
    Export(#[clap(flatten)] ExportArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);
    let config = load_config(args.config.as_deref())?;
    match args.mode {
        Mode::Report(arg) => report::run(&arg, &config)?,
        Mode::Export(arg) => export::run(&arg, &config)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let config: EngineConfig = read_json_file("config", path)?;
    let tolerance = config.enrage_tolerance_secs;
    if !config.confidence_z.is_finite() || tolerance.is_nan() || tolerance < 0.0 {
        anyhow::bail!(
            "Invalid config {}: confidence_z must be finite and enrage_tolerance_secs non-negative",
            path.display()
        );
    }
    tracing::debug!(
        enrage_entries = config.enrage.len(),
        jobs = config.jobs.len(),
        "loaded config"
    );
    Ok(config)
}
