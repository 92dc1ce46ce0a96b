use std::path::PathBuf;

use clap::Parser;

/// Bind the demo object to a headless surface, replay edits, and print the
/// resulting panel.
#[derive(Debug, Parser)]
#[command(name = "bindery-demo", version, about)]
pub struct Cli {
    /// Config file (defaults to $BINDERY_CONFIG, then built-in defaults).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Script of simulated user edits to replay after binding.
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Number of updates the background worker posts to the UI thread.
    #[arg(long, default_value_t = 3)]
    pub worker_ticks: u32,

    /// Log filter directives, overriding the config file.
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}
