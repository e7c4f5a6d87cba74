//! Graph abstraction layer over a transactional Cypher store.
//!
//! # Architecture
//!
//! - [`CypherExecutor`] - Execute Cypher statements
//! - [`Transaction`] - Transaction lifecycle (commit/rollback)
//! - [`GraphClient`] - Connection management and transaction creation
//! - [`Graph`] - Wrapper adding scoped transactions and deadlines
//!
//! # Usage
//!
//! ```ignore
//! use futures::FutureExt;
//! use matchgraph::graph::{Graph, QueryExt};
//!
//! let graph = Graph::new(client).with_timeout(Some(Duration::from_secs(5)));
//!
//! // Read in an auto-commit transaction
//! let row = graph
//!     .read(|client| {
//!         client
//!             .query("MATCH (p:Player {id: $id}) RETURN p.name AS name")
//!             .param("id", id)
//!             .fetch_one()
//!             .boxed()
//!     })
//!     .await?;
//!
//! // Write in an explicit transaction, committed when the closure succeeds
//! graph
//!     .write(move |txn| {
//!         async move {
//!             txn.query("CREATE (p:Player {id: $id, name: $name})")
//!                 .param("id", id)
//!                 .param("name", name)
//!                 .run()
//!                 .await
//!         }
//!         .boxed()
//!     })
//!     .await?;
//! ```

mod query;
mod row;
mod traits;

pub mod backends;

#[cfg(test)]
pub(crate) mod testing;

pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::{CypherExecutor, GraphClient, Transaction};

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;

use crate::error::AppError;

/// Longest a failed write waits for its rollback.
pub const ROLLBACK_GRACE: Duration = Duration::from_millis(250);

/// High-level wrapper over any [`GraphClient`].
///
/// `Graph` provides:
/// - Auto-commit reads via [`read`](Graph::read)
/// - Scoped write transactions via [`write`](Graph::write)
/// - An optional deadline applied to every read and write
pub struct Graph<C: GraphClient> {
    client: C,
    timeout: Option<Duration>,
}

impl<C: GraphClient> Graph<C> {
    /// Creates a new graph wrapper with no deadline.
    pub fn new(client: C) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Sets the per-operation deadline. `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Creates a query builder for a direct (auto-commit) query.
    ///
    /// Direct queries are not bounded by the deadline; use
    /// [`read`](Graph::read) for that.
    pub fn query(&self, cypher: &str) -> Query<'_, C> {
        Query::new(&self.client, cypher)
    }

    /// Runs a read against the client in an auto-commit transaction.
    pub async fn read<'g, R, F>(&'g self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&'g C) -> BoxFuture<'g, Result<R, AppError>>,
    {
        let deadline = self.deadline();
        self.within(deadline, f(&self.client)).await
    }

    /// Runs `f` inside a write transaction.
    ///
    /// The transaction is committed when `f` returns `Ok` and rolled back
    /// when it returns `Err` or the deadline expires. The deadline covers
    /// begin, the closure and commit together. Rollback gets at most
    /// [`ROLLBACK_GRACE`] on top of it; an unfinished rollback is abandoned
    /// and the server discards the transaction.
    ///
    /// Values captured by `f` must be owned; the future borrows only the
    /// transaction.
    pub async fn write<'g, R, F>(&'g self, f: F) -> Result<R, AppError>
    where
        F: for<'t> FnOnce(&'t C::Tx<'g>) -> BoxFuture<'t, Result<R, AppError>>,
    {
        let deadline = self.deadline();
        let txn = self.within(deadline, self.client.begin()).await?;

        let outcome = self.within(deadline, f(&txn)).await;

        match outcome {
            Ok(value) => {
                self.within(deadline, txn.commit()).await?;
                Ok(value)
            }
            Err(err) => {
                match tokio::time::timeout(ROLLBACK_GRACE, txn.rollback()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(rollback_err)) => {
                        tracing::warn!(error = %rollback_err, "Rollback after failed write also failed");
                    }
                    Err(_) => {
                        tracing::warn!(
                            grace = ?ROLLBACK_GRACE,
                            "Rollback did not finish in time; leaving it to the server"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|limit| Instant::now() + limit)
    }

    async fn within<R, Fut>(&self, deadline: Option<Instant>, fut: Fut) -> Result<R, AppError>
    where
        Fut: Future<Output = Result<R, AppError>>,
    {
        match (deadline, self.timeout) {
            (Some(deadline), Some(limit)) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| AppError::Timeout(limit))?,
            _ => fut.await,
        }
    }
}

// Forward CypherExecutor to the underlying client for convenience
#[async_trait::async_trait]
impl<C: GraphClient> CypherExecutor for Graph<C> {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        self.client.execute_cypher(cypher, params).await
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.client.run_cypher(cypher, params).await
    }
}
