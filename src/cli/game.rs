//! Match subcommands.

use clap::Subcommand;
use color_eyre::Result;
use serde_json::json;

use crate::config::Config;
use crate::context::Context;
use crate::error::AppError;
use crate::repositories::MatchRepository;

use super::print_json;

#[derive(Subcommand)]
pub enum MatchCommand {
    /// Record a match and link its players
    Create {
        /// Free-form result, e.g. "Player 1 wins"
        #[arg(long)]
        result: String,

        /// Participating player ID (repeatable; duplicates are kept)
        #[arg(long = "player")]
        players: Vec<String>,
    },

    /// Print the recorded result of a match
    Result { id: String },

    /// Show a match and its participants
    Show { id: String },

    /// List matches a player took part in
    History { player_id: String },
}

impl MatchCommand {
    pub async fn run(self) -> Result<()> {
        let ctx = Context::from(Config::load()?).await?;
        let matches: MatchRepository = ctx.resolve();

        match self {
            MatchCommand::Create { result, players } => {
                let created = matches.create(&result, &players).await?;
                tracing::info!(match_id = %created.game.id, linked = created.linked, "Match created");
                print_json(&created)
            }
            MatchCommand::Result { id } => match matches.get_result(&id).await? {
                Some(result) => {
                    println!("{}", result);
                    Ok(())
                }
                None => Err(AppError::MatchNotFound(id).into()),
            },
            MatchCommand::Show { id } => {
                let Some(game) = matches.find_by_id(&id).await? else {
                    return Err(AppError::MatchNotFound(id).into());
                };
                let participants = matches.participants(&id).await?;
                print_json(&json!({
                    "id": game.id,
                    "result": game.result,
                    "created_at": game.created_at,
                    "participants": participants,
                }))
            }
            MatchCommand::History { player_id } => {
                print_json(&matches.list_for_player(&player_id).await?)
            }
        }
    }
}
