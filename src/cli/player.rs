//! Player subcommands.

use clap::Subcommand;
use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::error::AppError;
use crate::repositories::PlayerRepository;

use super::print_json;

#[derive(Subcommand)]
pub enum PlayerCommand {
    /// Create a player and print it
    Create {
        /// Player name (need not be unique)
        name: String,
    },

    /// Show a player by ID
    Show { id: String },

    /// List players with an exact name
    Find { name: String },

    /// Rename a player
    Rename { id: String, name: String },

    /// Delete a player and its participation links
    Delete { id: String },
}

impl PlayerCommand {
    pub async fn run(self) -> Result<()> {
        let ctx = Context::from(Config::load()?).await?;
        let players: PlayerRepository = ctx.resolve();

        match self {
            PlayerCommand::Create { name } => {
                let player = players.create(&name).await?;
                tracing::info!(player_id = %player.id, "Player created");
                print_json(&player)
            }
            PlayerCommand::Show { id } => match players.find_by_id(&id).await? {
                Some(player) => print_json(&player),
                None => Err(AppError::PlayerNotFound(id).into()),
            },
            PlayerCommand::Find { name } => print_json(&players.find_by_name(&name).await?),
            PlayerCommand::Rename { id, name } => match players.update(&id, &name).await? {
                Some(player) => print_json(&player),
                None => Err(AppError::PlayerNotFound(id).into()),
            },
            PlayerCommand::Delete { id } => {
                if players.delete(&id).await? {
                    tracing::info!(player_id = %id, "Player deleted");
                    Ok(())
                } else {
                    Err(AppError::PlayerNotFound(id).into())
                }
            }
        }
    }
}
