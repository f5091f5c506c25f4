//! User commands: inspect and change XP and levels

use anyhow::Result;
use clap::Subcommand;

use guild_xp::parse_amount;

use super::{print_outcome, print_value, render_user, GlobalOpts};

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a user with zero XP
    Create { guild: String, user: String },

    /// Delete a user's record
    Delete { guild: String, user: String },

    /// Show a user's XP and level
    Show {
        guild: String,
        user: String,

        /// Include the user's rank in the guild
        #[arg(short, long)]
        position: bool,
    },

    /// Add XP
    AddXp { guild: String, user: String, amount: String },

    /// Replace the XP total
    SetXp { guild: String, user: String, amount: String },

    /// Remove XP (stops at zero)
    SubXp { guild: String, user: String, amount: String },

    /// Add levels (negative amounts remove levels)
    #[command(allow_negative_numbers = true)]
    AddLevel { guild: String, user: String, amount: String },

    /// Replace the level
    SetLevel { guild: String, user: String, level: String },

    /// Remove levels (stops at zero)
    #[command(allow_negative_numbers = true)]
    SubLevel { guild: String, user: String, amount: String },
}

pub fn user_command(opts: &GlobalOpts, command: UserCommand) -> Result<()> {
    let (_config, store) = opts.open_store()?;
    let levels = store.levels()?;

    match command {
        UserCommand::Create { guild, user } => {
            print_outcome(opts.json, levels.create_user(&user, &guild)?, "User", render_user)
        }
        UserCommand::Delete { guild, user } => print_outcome(
            opts.json,
            levels.delete_user(&user, &guild)?,
            "User",
            |deleted| println!("Deleted user {} (level {}, {} xp)", deleted.user_id, deleted.level, deleted.xp),
        ),
        UserCommand::Show {
            guild,
            user,
            position,
        } => print_outcome(opts.json, levels.fetch(&user, &guild, position)?, "User", render_user),
        UserCommand::AddXp {
            guild,
            user,
            amount,
        } => {
            let leveled_up = levels.append_xp(&user, &guild, parse_amount(&amount)?)?;
            print_value(opts.json, &leveled_up, |leveled_up| {
                if *leveled_up {
                    println!("Level up!");
                } else {
                    println!("XP added");
                }
            })
        }
        UserCommand::SetXp {
            guild,
            user,
            amount,
        } => print_outcome(
            opts.json,
            levels.set_xp(&user, &guild, parse_amount(&amount)?)?,
            "User",
            render_user,
        ),
        UserCommand::SubXp {
            guild,
            user,
            amount,
        } => print_outcome(
            opts.json,
            levels.subtract_xp(&user, &guild, parse_amount(&amount)?)?,
            "User",
            render_user,
        ),
        UserCommand::AddLevel {
            guild,
            user,
            amount,
        } => print_outcome(
            opts.json,
            levels.append_level(&user, &guild, parse_amount(&amount)?)?,
            "User",
            render_user,
        ),
        UserCommand::SetLevel { guild, user, level } => print_outcome(
            opts.json,
            levels.set_level(&user, &guild, parse_amount(&level)?)?,
            "User",
            render_user,
        ),
        UserCommand::SubLevel {
            guild,
            user,
            amount,
        } => print_outcome(
            opts.json,
            levels.subtract_level(&user, &guild, parse_amount(&amount)?)?,
            "User",
            render_user,
        ),
    }
}
