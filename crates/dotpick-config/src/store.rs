//! Persisted team names.
//!
//! The names are kept as one newline-separated string under a single key of
//! a TOML table, so other keys in the same file survive a save.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{ConfigError, data_dir, write_file};

/// Key the raw name list is stored under.
pub const NAMES_KEY: &str = "standup_names";

/// Split raw editor text into names, trimming and dropping blank lines.
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Key-value file holding the team names.
#[derive(Debug, Clone)]
pub struct NameStore {
    path: PathBuf,
}

impl NameStore {
    /// Use a specific file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `names.toml` in the platform data dir.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(data_dir()?.join("names.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the table, or an empty one if the file is missing.
    fn read_table(&self) -> Result<toml::Table, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(toml::Table::new()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        contents.parse().map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// The raw stored text, if any.
    ///
    /// A missing, unreadable or malformed store reads as no text at all.
    pub fn load_raw(&self) -> Option<String> {
        match self.read_table() {
            Ok(table) => table
                .get(NAMES_KEY)
                .and_then(|value| value.as_str())
                .map(str::to_string),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable name store");
                None
            }
        }
    }

    /// The stored names, empty when no team is configured.
    pub fn load(&self) -> Vec<String> {
        self.load_raw().map(|raw| parse_names(&raw)).unwrap_or_default()
    }

    /// Store `raw` and return the names it contains.
    ///
    /// Text without a single name is rejected and nothing is written.
    pub fn save(&self, raw: &str) -> Result<Vec<String>, ConfigError> {
        let names = parse_names(raw);
        if names.is_empty() {
            return Err(ConfigError::NoNames);
        }

        let mut table = self.read_table().unwrap_or_default();
        table.insert(NAMES_KEY.to_string(), toml::Value::String(raw.to_string()));
        write_file(&self.path, &toml::to_string(&table)?)?;

        debug!(count = names.len(), path = %self.path.display(), "saved names");
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_path;

    #[test]
    fn test_parse_names() {
        assert_eq!(
            parse_names("  Alice \n\nBob\n   \nCarol"),
            vec!["Alice", "Bob", "Carol"]
        );
        assert!(parse_names("\n  \n").is_empty());
    }

    #[test]
    fn test_missing_store_is_empty() {
        let store = NameStore::new(temp_path("names.toml"));
        assert_eq!(store.load_raw(), None);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_round_trip_keeps_raw_text() {
        let store = NameStore::new(temp_path("names.toml"));
        let names = store.save("Alice\n Bob \n").unwrap();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(store.load_raw().as_deref(), Some("Alice\n Bob \n"));
        assert_eq!(store.load(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_empty_save_is_rejected() {
        let store = NameStore::new(temp_path("names.toml"));
        assert!(matches!(store.save("  \n"), Err(ConfigError::NoNames)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_malformed_store_reads_as_empty() {
        let path = temp_path("names.toml");
        write_file(&path, "standup_names = [unterminated").unwrap();
        let store = NameStore::new(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_other_keys_survive_save() {
        let path = temp_path("names.toml");
        write_file(&path, "theme = \"dark\"\n").unwrap();
        let store = NameStore::new(path.clone());
        store.save("Dana").unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("theme"));
        assert_eq!(store.load(), vec!["Dana"]);
    }
}
