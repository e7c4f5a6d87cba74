//! Domain models for players, matches and their participation links.

mod game;
mod ids;
mod player;

pub use game::{CreatedMatch, Match};
pub use ids::generate_ulid;
pub use player::Player;
