//! Neo4j backend over the Bolt protocol.
//!
//! Wraps the `neo4rs` driver. Auto-commit queries stream rows from a pooled
//! connection; transactions hold one connection until commit or rollback.
//!
//! ```ignore
//! use matchgraph::graph::backends::neo4j::Neo4jClient;
//! use matchgraph::graph::{Graph, QueryExt};
//!
//! let client = Neo4jClient::connect(&config.neo4j).await?;
//! let graph = Graph::new(client);
//! ```

use std::collections::HashMap;

use async_stream::try_stream;
use async_trait::async_trait;
use neo4rs::{BoltList, BoltMap, BoltNull, BoltString, BoltType, ConfigBuilder, Txn};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

use crate::config::Neo4jConfig;
use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::{CypherExecutor, GraphClient, Transaction};

/// Neo4j graph client.
///
/// Cheap to clone; the driver's connection pool is shared.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: neo4rs::Graph,
}

impl Neo4jClient {
    /// Connects to Neo4j with the configured credentials and pool size.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, AppError> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_deref().unwrap_or(""))
            .max_connections(config.connections);
        if let Some(database) = config.database.as_deref() {
            builder = builder.db(database);
        }

        let graph = neo4rs::Graph::connect(builder.build()?).await?;
        Ok(Self { graph })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let graph = self.graph.clone();
        let cypher = cypher.to_string();
        let bolt_query = build_query(&cypher, params);

        Ok(Box::pin(try_stream! {
            let mut rows = graph
                .execute(bolt_query)
                .await
                .map_err(|e| query_error(e, &cypher))?;

            while let Some(row) = rows.next().await.map_err(|e| query_error(e, &cypher))? {
                yield parse_row(&row)?;
            }
        }))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.graph
            .run(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))
    }
}

#[async_trait]
impl GraphClient for Neo4jClient {
    type Tx<'a> = Neo4jTransaction;

    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        let txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| query_error(e, "BEGIN"))?;
        Ok(Neo4jTransaction {
            txn: Mutex::new(Some(txn)),
        })
    }
}

/// An explicit Neo4j transaction.
///
/// Rows are buffered per statement, since reading them needs the
/// transaction's connection.
pub struct Neo4jTransaction {
    txn: Mutex<Option<Txn>>,
}

impl Neo4jTransaction {
    async fn take(&self) -> Result<Txn, AppError> {
        self.txn
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::Internal("transaction already finished".into()))
    }
}

#[async_trait]
impl CypherExecutor for Neo4jTransaction {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let mut guard = self.txn.lock().await;
        let txn = guard
            .as_mut()
            .ok_or_else(|| AppError::Internal("transaction already finished".into()))?;

        let mut stream = txn
            .execute(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next(txn.handle())
            .await
            .map_err(|e| query_error(e, cypher))?
        {
            rows.push(parse_row(&row)?);
        }

        Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok))))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        let mut guard = self.txn.lock().await;
        let txn = guard
            .as_mut()
            .ok_or_else(|| AppError::Internal("transaction already finished".into()))?;

        txn.run(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))
    }
}

#[async_trait]
impl Transaction for Neo4jTransaction {
    async fn commit(self) -> Result<(), AppError> {
        self.take()
            .await?
            .commit()
            .await
            .map_err(|e| query_error(e, "COMMIT"))
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.take()
            .await?
            .rollback()
            .await
            .map_err(|e| query_error(e, "ROLLBACK"))
    }
}

impl Drop for Neo4jTransaction {
    fn drop(&mut self) {
        if self.txn.get_mut().is_some() {
            tracing::warn!(
                "Neo4jTransaction dropped without commit or rollback - server will roll it back"
            );
        }
    }
}

/// Store-side failure of a statement or of a transaction step.
fn query_error(err: impl std::fmt::Display, cypher: &str) -> AppError {
    AppError::Query {
        message: err.to_string(),
        query: cypher.to_string(),
    }
}

/// Binds JSON parameters onto a Bolt query.
fn build_query(cypher: &str, params: Params) -> neo4rs::Query {
    params
        .into_iter()
        .fold(neo4rs::query(cypher), |q, (name, value)| {
            q.param(&name, to_bolt(value))
        })
}

/// Converts a JSON value to its Bolt equivalent.
///
/// Integral numbers become Bolt integers so they compare equal to
/// integers stored by other clients.
fn to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::from(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => BoltType::from(i),
            None => BoltType::from(n.as_f64().unwrap_or_default()),
        },
        JsonValue::String(s) => BoltType::from(s),
        JsonValue::Array(items) => BoltType::List(BoltList {
            value: items.into_iter().map(to_bolt).collect(),
        }),
        JsonValue::Object(map) => BoltType::Map(BoltMap {
            value: map
                .into_iter()
                .map(|(k, v)| (BoltString::from(k), to_bolt(v)))
                .collect(),
        }),
    }
}

fn parse_row(row: &neo4rs::Row) -> Result<Row, AppError> {
    row.to::<HashMap<String, JsonValue>>()
        .map(Row::new)
        .map_err(|e| AppError::Internal(format!("failed to decode row: {}", e)))
}
