//! Role reward commands

use anyhow::{bail, Result};
use clap::Subcommand;

use guild_xp::{parse_amount, RoleReward};

use super::{print_outcome, print_value, GlobalOpts};

#[derive(Subcommand)]
pub enum RewardCommand {
    /// Grant a role when users reach a level
    Add {
        guild: String,
        level: String,
        role: String,
    },

    /// Remove the reward of a level
    Remove { guild: String, level: String },

    /// Show the reward of a level
    Show { guild: String, level: String },

    /// List all rewards of a guild
    List { guild: String },
}

fn render_reward(reward: &RoleReward) {
    println!("Level {:>4} -> role {}", reward.level, reward.role_id);
}

pub fn reward_command(opts: &GlobalOpts, command: RewardCommand) -> Result<()> {
    let (_config, store) = opts.open_store()?;
    let rewards = store.rewards()?;

    match command {
        RewardCommand::Add { guild, level, role } => print_outcome(
            opts.json,
            rewards.create_role_reward(&guild, parse_amount(&level)?, &role)?,
            "Reward",
            render_reward,
        ),
        RewardCommand::Remove { guild, level } => {
            if !rewards.delete_role_reward(&guild, parse_amount(&level)?)? {
                bail!("No reward for level {} in guild {}", level, guild);
            }
            print_value(opts.json, &true, |_| println!("Reward removed"))
        }
        RewardCommand::Show { guild, level } => print_outcome(
            opts.json,
            rewards.fetch_role_reward(&guild, parse_amount(&level)?)?,
            "Reward",
            render_reward,
        ),
        RewardCommand::List { guild } => {
            let list = rewards.fetch_role_rewards(&guild)?;
            print_value(opts.json, &list, |list| {
                if list.is_empty() {
                    println!("No rewards configured.");
                }
                for reward in list {
                    render_reward(reward);
                }
            })
        }
    }
}
