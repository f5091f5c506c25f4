//! Init command implementation

use anyhow::{bail, Context, Result};

use guild_xp::config::Config;
use guild_xp::ensure_schema;

use super::GlobalOpts;

/// Default configuration content for guild-xp init
pub const DEFAULT_CONFIG: &str = r#"# guild-xp configuration
# =====================

# ============================================================================
# DATABASE
# ============================================================================
#
#   path            - SQLite file (default: ~/.guild-xp/xp.db)
#   busy_timeout_ms - How long to wait on a locked database (default: 5000)

[database]
# path = "/var/lib/guild-xp/xp.db"
busy_timeout_ms = 5000

# ============================================================================
# LEADERBOARD
# ============================================================================
#
#   default_limit - Rows shown by `guild-xp leaderboard` (default: 10)
#   fetch_missing - Resolve users that are not cached (default: false)

[leaderboard]
default_limit = 10
fetch_missing = false

# ============================================================================
# DIRECTORY - Known users
# ============================================================================
#
# Used for leaderboard names and by `guild-xp guild clean`, which deletes
# the records of users NOT listed here. Keys are user ids.
#
#   [directory.users.123456789012345678]
#   username = "alice"
#   discriminator = "0001"
"#;

/// Write the default config and create the database
pub fn init_command(opts: &GlobalOpts, force: bool) -> Result<()> {
    let config_path = opts.config_path();

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    Config::write_file(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created: {}", config_path.display());

    let config = Config::from_file(&config_path)?;
    let db_path = opts.database_path(&config);
    ensure_schema(&db_path)
        .with_context(|| format!("Failed to create database: {}", db_path.display()))?;
    println!("Database: {}", db_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }
}
