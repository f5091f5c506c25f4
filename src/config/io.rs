//! Configuration file I/O operations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.guild-xp/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".guild-xp")
    }

    /// Get the global config file path (~/.guild-xp/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load the config at `path`, or the global config when `path` is `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file_or_default(path),
            None => Self::from_file_or_default(&Self::global_config_path()),
        }
    }

    /// Write raw config text to `path`, replacing any existing file.
    ///
    /// Writers serialize on an exclusive `fs2` lock over `<path>.toml.lock`.
    /// The text lands in `<path>.toml.tmp` first and is renamed into place,
    /// so readers never see a half-written file.
    pub fn write_file(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let lock_path = path.with_extension("toml.lock");
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to open config lock: {}", lock_path.display()))?;
        lock.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;

        let staged = path.with_extension("toml.tmp");
        let mut file = File::create(&staged)
            .with_context(|| format!("Failed to stage config: {}", staged.display()))?;
        file.write_all(content.as_bytes())
            .and_then(|_| file.sync_all())
            .with_context(|| format!("Failed to write {}", staged.display()))?;

        std::fs::rename(&staged, path)
            .with_context(|| format!("Failed to move config into place: {}", path.display()))?;

        // Dropping `lock` releases it
        Ok(())
    }
}
