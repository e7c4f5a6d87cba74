//! Application error types.

use std::time::Duration;

use thiserror::Error;

/// Application-level errors for matchgraph.
#[derive(Error, Debug)]
pub enum AppError {
    // Neo4j errors
    #[error("Neo4j connection error: {0}")]
    Connection(#[from] neo4rs::Error),

    #[error("Neo4j query error: {message}")]
    Query { message: String, query: String },

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    // Domain errors
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}
