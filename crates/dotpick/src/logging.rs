//! File logging.
//!
//! The terminal belongs to the UI, so log lines go to `dotpick.log` in the
//! data directory instead.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "dotpick.log";

/// Install the global subscriber and return the log file's path.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init(default_filter: &str) -> color_eyre::Result<PathBuf> {
    let dir = dotpick_config::data_dir()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE);
    let file = File::options().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))?;

    Ok(path)
}
