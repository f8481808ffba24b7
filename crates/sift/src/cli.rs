use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[command(name = "sift", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Configuration file. Defaults to `sift.toml` in the working directory
    /// when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Download every URL of a manifest, keeping one file per distinct content
    #[command(alias = "f", name = "fetch")]
    Fetch(FetchArg),

    /// Report files in a directory whose content duplicates another file
    #[command(alias = "s", name = "scan")]
    Scan(ScanArg),
}

#[derive(Clone, Debug, Args)]
pub struct FetchArg {
    /// Manifest file with a `url` column.
    pub manifest: PathBuf,

    /// Directory receiving unique files.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Directory for in-progress downloads.
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Maximum downloads in flight.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Extra attempts for retryable transport failures.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Only fetch URLs containing this substring (repeatable).
    #[arg(long = "contains", value_name = "TEXT")]
    pub contains: Vec<String>,

    /// Only fetch files with this extension (repeatable).
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ScanArg {
    /// Directory to scan.
    pub dir: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}
