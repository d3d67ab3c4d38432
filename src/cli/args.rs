use crate::scoring::ScoreSource;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AQS-EVAL: Agent Quality Score comparison
///
/// Scores code-quality benchmark results of AI coding agents and compares
/// them across agents, modes and tasks.
#[derive(Parser, Debug)]
#[command(name = "aqs-eval")]
#[command(version = "0.1.0")]
#[command(about = "Score and compare AI coding agent evaluation results")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare all results in a directory
    Compare(CompareArgs),

    /// Score a single result file
    Score(ScoreArgs),

    /// Generate a sample compare config file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Directory containing result JSON files
    pub results_dir: PathBuf,

    /// Write the HTML report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Also publish the HTML report to the configured site path
    #[arg(long)]
    pub emit_site: bool,

    /// Write the report data as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Path to the compare config file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only include tasks of this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Where composite scores come from
    #[arg(long, value_enum, default_value_t = ScoreSource::PreferEmbedded)]
    pub score_source: ScoreSource,
}

#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Result JSON file to score
    pub file: PathBuf,

    /// Print the score as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output path for the config file
    #[arg(short, long, default_value = "compare-config.yaml")]
    pub output: PathBuf,
}
