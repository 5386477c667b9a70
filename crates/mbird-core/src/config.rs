//! Console configuration: the last directory used to create or load a project

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "MBIRD_CONFIG_DIR";

/// File holding the last used directory as plain text
pub const LAST_DIRECTORY_FILE: &str = "last_directory";

/// The user's home directory, falling back to `/`.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    dir: PathBuf,
}

impl ConsoleConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ConsoleConfig { dir: dir.into() }
    }

    /// `$MBIRD_CONFIG_DIR`, else `~/.mbird`.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::new(home_dir().join(".mbird")),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn last_directory_file(&self) -> PathBuf {
        self.dir.join(LAST_DIRECTORY_FILE)
    }

    /// The last used directory, or the home directory if none is saved.
    pub fn last_directory(&self) -> String {
        match std::fs::read_to_string(self.last_directory_file()) {
            Ok(contents) if !contents.trim().is_empty() => contents.trim().to_string(),
            Ok(_) => home_dir().display().to_string(),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Cannot read last directory: {}", e);
                }
                home_dir().display().to_string()
            }
        }
    }

    pub fn save_last_directory(&self, path: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.last_directory_file(), path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_returns_home_when_nothing_saved() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConsoleConfig::new(temp_dir.path().join(".mbird"));
        assert_eq!(config.last_directory(), home_dir().display().to_string());
    }

    #[test]
    fn test_save_creates_dir_and_writes_path() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConsoleConfig::new(temp_dir.path().join(".mbird"));

        config.save_last_directory("/some/test/path").unwrap();

        let file = config.dir().join(LAST_DIRECTORY_FILE);
        assert_eq!(std::fs::read_to_string(file).unwrap(), "/some/test/path");
        assert_eq!(config.last_directory(), "/some/test/path");
    }

    #[test]
    fn test_save_overwrites_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConsoleConfig::new(temp_dir.path().join(".mbird"));

        config.save_last_directory("/first/path").unwrap();
        config.save_last_directory("/second/path").unwrap();

        assert_eq!(config.last_directory(), "/second/path");
    }
}
