//! Core traits for graph database abstraction.
//!
//! This module defines the trait hierarchy that backends must implement:
//!
//! - [`CypherExecutor`] - Run Cypher statements
//! - [`Transaction`] - Transaction lifecycle management
//! - [`GraphClient`] - Connection pool and transaction creation

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::row::{Params, RowStream};

/// Executes Cypher queries against a graph database.
///
/// This is the core trait that all graph backends must implement.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// Use this for queries that return data (MATCH, RETURN), including
    /// writes that end in a RETURN clause.
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations (CREATE, MERGE, DELETE, SET) and schema
    /// statements.
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError>;
}

/// Transaction lifecycle management.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes permanent.
    async fn commit(self) -> Result<(), AppError>;

    /// Rolls back the transaction, discarding all changes.
    async fn rollback(self) -> Result<(), AppError>;
}

/// A graph database client that can begin transactions.
///
/// Implementations wrap a connection pool and provide auto-commit queries
/// via the executor methods, plus explicit transactions via
/// [`begin`](GraphClient::begin).
#[async_trait]
pub trait GraphClient: CypherExecutor {
    /// The transaction type returned by this client.
    type Tx<'a>: Transaction + CypherExecutor
    where
        Self: 'a;

    /// Begins a new transaction.
    ///
    /// The returned transaction must be either committed or rolled back.
    /// Prefer [`Graph::write`](crate::graph::Graph::write), which does this
    /// on every exit path.
    async fn begin(&self) -> Result<Self::Tx<'_>, AppError>;
}
