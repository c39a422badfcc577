use crate::commands::{
    run_analyze, run_check, run_ratios, run_recent, AnalyzeArgs, CheckArgs, RatiosArgs,
    RecentArgs,
};
use clap::{Parser, Subcommand};
use credilens::config::AppConfig;
use credilens::error::AppError;
use credilens::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "credilens",
    about = "Derive credit ratios, scores and provenance checks from extracted 10-K filings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze an extraction payload and write its artifacts
    Analyze(AnalyzeArgs),
    /// Print the ratio table for an extraction payload
    Ratios(RatiosArgs),
    /// Run the QA checks for an extraction payload
    Check(CheckArgs),
    /// List the most recently analyzed documents
    Recent(RecentArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, command = ?cli.command, "dispatching command");

    match cli.command {
        Command::Analyze(args) => run_analyze(&config, args),
        Command::Ratios(args) => run_ratios(&config, args),
        Command::Check(args) => run_check(args),
        Command::Recent(args) => run_recent(&config, args),
    }
}
