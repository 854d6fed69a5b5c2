/// Tracing setup.
///
/// The terminal is in raw mode on the alternate screen while the game runs,
/// so nothing may write to stdout/stderr. Logs go to the file named in
/// `[log] file`; without one no subscriber is installed and events are dropped.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install the file subscriber. Returns whether logging is active.
pub fn init(cfg: &LogConfig) -> anyhow::Result<bool> {
    let Some(path) = &cfg.file else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    // RUST_LOG overrides the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid log level {:?}", cfg.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;
    Ok(true)
}
