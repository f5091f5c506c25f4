//! Leaderboard and guild maintenance commands

use anyhow::{bail, Result};
use clap::Subcommand;

use guild_xp::compute_leaderboard;

use super::{print_value, GlobalOpts};

#[derive(Subcommand)]
pub enum GuildCommand {
    /// Delete users that are not in the configured directory
    Clean { guild: String },

    /// Delete every record and reward of a guild
    Delete {
        guild: String,

        /// Required to actually delete
        #[arg(long)]
        yes: bool,
    },
}

/// Show the top users of a guild with names from the directory
pub async fn leaderboard_command(
    opts: &GlobalOpts,
    guild: &str,
    limit: Option<usize>,
    fetch_missing: bool,
) -> Result<()> {
    let (config, store) = opts.open_store()?;
    let limit = limit.unwrap_or(config.leaderboard.default_limit);
    let fetch_missing = fetch_missing || config.leaderboard.fetch_missing;

    let board = store.levels()?.fetch_leaderboard(guild, limit)?;
    let directory = config.directory.to_directory();
    let computed = compute_leaderboard(&directory, &board, fetch_missing).await;

    print_value(opts.json, &computed, |computed| {
        if computed.is_empty() {
            println!("No users in guild {}.", guild);
        }
        for entry in computed {
            println!(
                "#{:<3} {:<24} level {:>3}  {:>8} xp",
                entry.position,
                entry.tag(),
                entry.user.level,
                entry.user.xp
            );
        }
    })
}

pub async fn guild_command(opts: &GlobalOpts, command: GuildCommand) -> Result<()> {
    let (config, store) = opts.open_store()?;
    let maintenance = store.maintenance()?;

    match command {
        GuildCommand::Clean { guild } => {
            let directory = config.directory.to_directory();
            if directory.is_empty() {
                bail!("The directory is empty; refusing to clean (every user would be deleted)");
            }
            let deleted = maintenance.clean_database(&directory, &guild).await?;
            print_value(opts.json, &deleted, |deleted| {
                println!("Deleted {} users", deleted.len());
                for id in deleted {
                    println!("  {}", id);
                }
            })
        }
        GuildCommand::Delete { guild, yes } => {
            if !yes {
                bail!("Deleting guild {} removes all its data; pass --yes to confirm", guild);
            }
            if !maintenance.delete_guild(&guild)? {
                bail!("Failed to delete guild {} (nothing was changed)", guild);
            }
            print_value(opts.json, &true, |_| println!("Guild {} deleted", guild))
        }
    }
}
