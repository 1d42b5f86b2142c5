//! Configuration and persisted team names for dotpick.
//!
//! Both live in TOML files under the platform directories resolved by
//! `directories`: `config.toml` in the config dir and `names.toml` in the
//! data dir.

mod config;
mod store;

use std::path::PathBuf;

use directories::ProjectDirs;
use thiserror::Error;

pub use config::Config;
pub use store::{NAMES_KEY, NameStore, parse_names};

/// Errors from reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a home directory")]
    NoProjectDirs,
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("please enter at least one name")]
    NoNames,
}

/// Platform directories for the application.
pub fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("", "", "dotpick").ok_or(ConfigError::NoProjectDirs)
}

/// Directory for logs and the name store.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Write `contents` to `path`, creating parent directories.
fn write_file(path: &std::path::Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
