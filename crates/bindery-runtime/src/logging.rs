#![forbid(unsafe_code)]

//! Subscriber setup.
//!
//! `BINDERY_LOG` takes precedence over the configured filter. Installing a
//! subscriber when one is already set is a no-op that returns `false`.

use std::env;

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Environment variable holding `EnvFilter` directives.
pub const LOG_ENV: &str = "BINDERY_LOG";

/// Install the global fmt subscriber. Returns whether it was installed.
pub fn init(config: &LogConfig) -> bool {
    let env_value = env::var(LOG_ENV).ok();
    let filter = filter_from(env_value.as_deref(), &config.filter);
    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    };
    if installed {
        tracing::debug!(json = config.json, "logging initialized");
    }
    installed
}

fn filter_from(env_value: Option<&str>, configured: &str) -> EnvFilter {
    env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
