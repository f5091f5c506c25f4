//! CLI command implementations

pub mod guild;
pub mod init;
pub mod reward;
pub mod user;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use guild_xp::config::Config;
use guild_xp::{xp_for_str, Outcome, UserLevel, XpStore};

/// Flags shared by every command
pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub json: bool,
}

impl GlobalOpts {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(Config::global_config_path)
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }

    /// Database path: `--database`, then the config file, then the default
    pub fn database_path(&self, config: &Config) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| config.database.resolved_path())
    }

    /// Load the config and open the store it points to
    pub fn open_store(&self) -> Result<(Config, XpStore)> {
        let config = self.load_config()?;
        let path = self.database_path(&config);

        let mut store = XpStore::new().with_busy_timeout(config.database.busy_timeout());
        store
            .configure(&path)
            .with_context(|| format!("Failed to open XP database: {}", path.display()))?;

        Ok((config, store))
    }
}

/// Print a value as pretty JSON or through `render`.
pub fn print_value<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

/// Print the value of an outcome, or fail with a message naming `what`.
pub fn print_outcome<T: Serialize>(
    json: bool,
    outcome: Outcome<T>,
    what: &str,
    render: impl FnOnce(&T),
) -> Result<()> {
    match outcome {
        Outcome::Value(value) => print_value(json, &value, render),
        Outcome::NotFound => bail!("{} not found", what),
        Outcome::Conflict => bail!("{} already exists", what),
        Outcome::StorageError => bail!("Database error while accessing {} (see log)", what),
    }
}

pub fn render_user(user: &UserLevel) {
    println!("User {} in guild {}", user.user_id, user.guild_id);
    println!("  Level: {}", user.level);
    println!("  XP:    {}", user.xp);
    if let (Some(clean), Some(span)) = (user.clean_xp, user.clean_next_level_xp) {
        println!("  Next:  {}/{} ({:.0}%)", clean, span, user.progress().fraction() * 100.0);
    }
    if let Some(position) = user.position {
        println!("  Rank:  #{}", position);
    }
    println!("  Updated: {}", user.last_updated);
}

/// Print the XP needed for a level
pub fn xp_for_command(opts: &GlobalOpts, level: &str) -> Result<()> {
    let xp = xp_for_str(level)?;
    print_value(opts.json, &xp, |xp| println!("{}", xp))
}
