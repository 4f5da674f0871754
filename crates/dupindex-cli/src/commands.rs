use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dupindex")]
#[command(about = "Index a directory tree by content and find duplicate files", long_about = None)]
pub struct Cli {
    /// Index database path (overrides configuration)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory (or every configured root) into the index
    Scan(ScanArgs),
    /// List every indexed file whose content appears more than once
    Show,
    /// Count indexed files whose content appears more than once
    Count,
    /// List indexed files with the given fingerprint
    Find {
        /// Hex-encoded SHA-256 fingerprint
        fingerprint: String,
    },
    /// List indexed files page by page
    List(ListArgs),
    /// Print configuration values
    PrintConfig,
    /// Delete every record from the index
    TruncateDb,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan; defaults to the configured root paths
    pub dir: Option<PathBuf>,

    /// Number of persistence workers
    #[arg(long)]
    pub workers: Option<usize>,

    /// Records per transaction
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    #[arg(long, default_value_t = 50)]
    pub per_page: usize,
}
