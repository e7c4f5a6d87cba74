//! CLI module for matchgraph.
//!
//! Subcommands:
//! - `init`: Apply schema migrations
//! - `player`: Create, show, find, rename and delete players
//! - `match`: Record matches and look up results

mod game;
mod init;
mod player;

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use game::MatchCommand;
pub use player::PlayerCommand;

use init::run_init;

/// matchgraph - players and matches in a Neo4j graph
#[derive(Parser)]
#[command(name = "matchgraph")]
#[command(about = "Record players and matches in a Neo4j graph")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending schema migrations (constraints and indexes)
    Init,

    /// Player lifecycle
    Player {
        #[command(subcommand)]
        command: PlayerCommand,
    },

    /// Match recording and lookup
    Match {
        #[command(subcommand)]
        command: MatchCommand,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Init => run_init().await,
            Command::Player { command } => command.run().await,
            Command::Match { command } => command.run().await,
        }
    }
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> color_eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_match_create_with_duplicate_players() {
        let app = App::try_parse_from([
            "matchgraph",
            "match",
            "create",
            "--result",
            "Player 1 wins",
            "--player",
            "p1",
            "--player",
            "p1",
        ])
        .unwrap();

        match app.command {
            Command::Match {
                command: MatchCommand::Create { result, players },
            } => {
                assert_eq!(result, "Player 1 wins");
                assert_eq!(players, vec!["p1", "p1"]);
            }
            _ => panic!("expected match create"),
        }
    }

    #[test]
    fn test_parse_player_rename() {
        let app = App::try_parse_from(["matchgraph", "-v", "player", "rename", "01HZX3", "X"])
            .unwrap();

        assert!(app.verbose);
        assert!(matches!(
            app.command,
            Command::Player {
                command: PlayerCommand::Rename { ref id, ref name }
            } if id == "01HZX3" && name == "X"
        ));
    }
}
