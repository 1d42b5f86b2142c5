//! Application settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dotpick_core::DotTheme;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ConfigError, project_dirs, write_file};

/// User-tunable settings, all optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spacing between shape sample points, in pixels.
    pub gap: u32,
    /// Longest wait for a shape to settle before moving on.
    pub settle_timeout_ms: u64,
    /// Distance under which a particle counts as settled.
    pub settle_threshold: f64,
    /// Target frames per second.
    pub frame_rate: u32,
    /// Virtual pixels per terminal column.
    pub cell_width_px: u32,
    /// Virtual pixels per terminal row.
    pub cell_height_px: u32,
    /// Dot fill color.
    pub dot_theme: DotTheme,
    /// Path or URL of the picture shown as the image shape.
    pub image_source: Option<String>,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gap: 13,
            settle_timeout_ms: 1550,
            settle_threshold: 1.2,
            frame_rate: 60,
            cell_width_px: 8,
            cell_height_px: 16,
            dot_theme: DotTheme::default(),
            image_source: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Location of `config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load from the default location.
    ///
    /// A missing file gives the defaults; an unreadable one also gives the
    /// defaults, with a warning.
    pub fn load() -> Self {
        let path = match Self::path() {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "using default config");
                return Self::default();
            }
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Load from a specific file. A missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Save to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        write_file(path, &contents)
    }

    /// Time budget of one frame.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frame_rate.max(1)))
    }

    /// Replace values that would break the engine with the defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.gap == 0 {
            self.gap = defaults.gap;
        }
        if self.frame_rate == 0 {
            self.frame_rate = defaults.frame_rate;
        }
        if self.cell_width_px == 0 {
            self.cell_width_px = defaults.cell_width_px;
        }
        if self.cell_height_px == 0 {
            self.cell_height_px = defaults.cell_height_px;
        }
        if !(self.settle_threshold.is_finite() && self.settle_threshold > 0.0) {
            self.settle_threshold = defaults.settle_threshold;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_path;

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_path("absent.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_path("partial.toml");
        write_file(&path, "gap = 10\ndot_theme = \"gold\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gap, 10);
        assert_eq!(config.dot_theme, DotTheme::Gold);
        assert_eq!(config.settle_timeout_ms, 1550);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_path("broken.toml");
        write_file(&path, "gap = \"wide\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_zero_values_are_sanitized() {
        let path = temp_path("zero.toml");
        write_file(&path, "gap = 0\nframe_rate = 0\nsettle_threshold = -1.0\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gap, 13);
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.settle_threshold, 1.2);
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("saved.toml");
        let config = Config {
            image_source: Some("logo.png".to_string()),
            dot_theme: DotTheme::Mint,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(Config::default().frame_interval(), Duration::from_millis(16));
    }
}
