use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Color output control
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal capability
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser, Debug)]
#[command(name = "eh-metrics")]
#[command(author, version, about = "Engineering-health metrics - keep code health from regressing")]
#[command(long_about = "Scans a multi-module source tree for code-health metrics, records \
    accepted values as git notes and fails builds whose metrics regress.\n\n\
    Exit codes:\n  \
    0 - All checks passed\n  \
    1 - Metrics regressed\n  \
    2 - Configuration or runtime error")]
pub struct Cli {
    /// Increase output verbosity (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorChoice,

    /// Skip loading configuration file
    #[arg(long, global = true)]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect metrics and print the snapshot
    Scan(ScanArgs),

    /// Compare metrics against the last accepted build
    Check(CheckArgs),

    /// Show which hit log lines changed since a previous build
    Investigate(InvestigateArgs),

    /// Write the metrics history data file
    Report(ReportArgs),
}

/// Options shared by every command that scans.
#[derive(Args, Debug, Clone)]
pub struct ScanOptions {
    /// Project root (default: discovered from the current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only collect metrics whose key contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// CI build number recorded in the snapshot
    #[arg(long)]
    pub build_number: Option<String>,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub scan: ScanOptions,

    /// Write the snapshot to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub scan: ScanOptions,

    /// Judge a previously saved snapshot instead of scanning
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Offer to accept regressions by recording an exclusion
    #[arg(short, long)]
    pub interactive: bool,

    /// Record the snapshot as the new baseline when the check passes
    #[arg(long)]
    pub record: bool,

    /// Where to write the JUnit report (default: in the state directory)
    #[arg(long)]
    pub junit: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InvestigateArgs {
    /// Metric keys to diff (default: the keys of the last failed check)
    pub keys: Vec<String>,

    /// Project root
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hit logs of the previous build (default: downloaded for --build)
    #[arg(long)]
    pub previous: Option<PathBuf>,

    /// Build whose hit logs are downloaded (default: from the failure marker)
    #[arg(long)]
    pub build: Option<String>,

    /// Hit logs of the current build (default: the last scan's)
    #[arg(long)]
    pub current: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Data file to write (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of accepted builds included (overrides config)
    #[arg(long)]
    pub max_points: Option<usize>,

    /// Append a point for the working tree, scanned now
    #[arg(long)]
    pub current: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
