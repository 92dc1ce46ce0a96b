use std::path::PathBuf;

use bindery_core::error::BindError;
use bindery_runtime::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("cannot read script {path}: {source}")]
    ScriptIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("script line {line}: {reason}")]
    Script { line: usize, reason: String },
    #[error("script step {step}: {reason}")]
    Replay { step: usize, reason: String },
    #[error("cannot start background worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("background worker panicked")]
    Worker,
}
