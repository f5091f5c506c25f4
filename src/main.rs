use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::guild::GuildCommand;
use cli::reward::RewardCommand;
use cli::user::UserCommand;

#[derive(Parser)]
#[command(name = "guild-xp")]
#[command(about = "Per-guild XP, levels and role rewards for chat bots")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.guild-xp/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file and create the database
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Inspect and change a user's XP and level
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Manage level -> role rewards
    Reward {
        #[command(subcommand)]
        command: RewardCommand,
    },

    /// Show the top users of a guild
    Leaderboard {
        guild: String,

        /// Number of rows (defaults to leaderboard.default_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Resolve users missing from the directory cache
        #[arg(long)]
        fetch_missing: bool,
    },

    /// Guild-wide maintenance
    Guild {
        #[command(subcommand)]
        command: GuildCommand,
    },

    /// Print the XP needed to reach a level
    XpFor { level: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = cli::GlobalOpts {
        config: cli.config,
        database: cli.database,
        json: cli.json,
    };

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(&opts, force)?;
        }
        Commands::User { command } => {
            cli::user::user_command(&opts, command)?;
        }
        Commands::Reward { command } => {
            cli::reward::reward_command(&opts, command)?;
        }
        Commands::Leaderboard {
            guild,
            limit,
            fetch_missing,
        } => {
            cli::guild::leaderboard_command(&opts, &guild, limit, fetch_missing).await?;
        }
        Commands::Guild { command } => {
            cli::guild::guild_command(&opts, command).await?;
        }
        Commands::XpFor { level } => {
            cli::xp_for_command(&opts, &level)?;
        }
    }

    Ok(())
}
