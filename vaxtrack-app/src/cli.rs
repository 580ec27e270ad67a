use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "vaxtrack.yaml";

/// Fetch yesterday's vaccination bulletin and append it to the dataset.
#[derive(Debug, Parser)]
#[command(name = "vaxtrack", version, about)]
pub struct Cli {
    /// YAML configuration file. Without it, `vaxtrack.yaml` is used if present.
    #[arg(short, long, env = "VAXTRACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD) instead of yesterday in the configured zone.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Directory holding the per-location CSV files.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Run only the source with this id.
    #[arg(long)]
    pub source: Option<String>,

    /// Print the record as JSON instead of writing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Mirror logs to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}
