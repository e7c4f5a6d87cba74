//! Data access layer for graph operations.
//!
//! Repositories hold only a shared [`Graph`](crate::graph::Graph) handle and
//! are resolved from the [`Context`](crate::context::Context) via `FromRef`.

mod game;
mod player;

pub use game::MatchRepository;
pub use player::PlayerRepository;
