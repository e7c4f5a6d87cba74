//! Query builder for fluent Cypher query construction.

use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// A builder for constructing and executing Cypher queries.
///
/// ```ignore
/// let row = txn
///     .query("MATCH (p:Player {id: $id}) RETURN p.name AS name")
///     .param("id", "01HZX3")
///     .fetch_one()
///     .await?;
/// ```
pub struct Query<'a, E: CypherExecutor + ?Sized> {
    executor: &'a E,
    cypher: String,
    params: Params,
    /// First parameter that failed to serialize; reported on execution.
    invalid: Option<AppError>,
}

impl<'a, E: CypherExecutor + ?Sized> Query<'a, E> {
    pub fn new(executor: &'a E, cypher: &str) -> Self {
        Self {
            executor,
            cypher: cypher.to_string(),
            params: Params::new(),
            invalid: None,
        }
    }

    /// Adds a parameter, referenced in Cypher as `$name`.
    ///
    /// A value that cannot be serialized makes the query fail when executed.
    pub fn param<T: Serialize>(mut self, name: &str, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.params.insert(name.to_string(), json);
            }
            Err(e) if self.invalid.is_none() => {
                self.invalid = Some(AppError::Internal(format!(
                    "failed to serialize parameter '{}': {}",
                    name, e
                )));
            }
            Err(_) => {}
        }
        self
    }

    /// Executes the query and returns a stream of rows.
    pub async fn execute(self) -> Result<RowStream<'a>, AppError> {
        if let Some(err) = self.invalid {
            return Err(err);
        }
        self.executor
            .execute_cypher(&self.cypher, self.params)
            .await
    }

    /// Executes the query and collects all rows into a vector.
    pub async fn fetch_all(self) -> Result<Vec<Row>, AppError> {
        self.execute().await?.try_collect().await
    }

    /// Executes the query and returns the first row, if any.
    pub async fn fetch_one(self) -> Result<Option<Row>, AppError> {
        let mut stream = self.execute().await?;
        stream.next().await.transpose()
    }

    /// Executes the query without returning results.
    pub async fn run(self) -> Result<(), AppError> {
        if let Some(err) = self.invalid {
            return Err(err);
        }
        self.executor.run_cypher(&self.cypher, self.params).await
    }
}

/// Extension trait providing `executor.query("...")` for every
/// [`CypherExecutor`].
pub trait QueryExt: CypherExecutor {
    fn query(&self, cypher: &str) -> Query<'_, Self>
    where
        Self: Sized,
    {
        Query::new(self, cypher)
    }
}

impl<E: CypherExecutor> QueryExt for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;
    use serde_json::json;

    use crate::graph::testing::MockClient;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable"))
        }
    }

    #[tokio::test]
    async fn test_query_records_params() {
        let client = MockClient::new();

        client
            .query("MATCH (p:Player {id: $id}) SET p.name = $name")
            .param("id", "01HZX3")
            .param("name", "Renamed")
            .run()
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].cypher, "MATCH (p:Player {id: $id}) SET p.name = $name");
        assert_eq!(calls[0].params["id"], json!("01HZX3"));
        assert_eq!(calls[0].params["name"], json!("Renamed"));
    }

    #[tokio::test]
    async fn test_fetch_one_empty_result() {
        let client = MockClient::new();
        client.respond(vec![]);

        let row = client
            .query("MATCH (m:Match {id: $id}) RETURN m.result AS result")
            .param("id", "missing")
            .fetch_one()
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_sequence_param() {
        let client = MockClient::new();

        client
            .query("UNWIND $players AS player_id RETURN player_id")
            .param("players", vec!["a", "a", "b"])
            .fetch_all()
            .await
            .unwrap();

        assert_eq!(client.calls()[0].params["players"], json!(["a", "a", "b"]));
    }

    #[tokio::test]
    async fn test_unserializable_param_fails_without_executing() {
        let client = MockClient::new();

        let result = client
            .query("CREATE (p:Player {name: $name})")
            .param("name", Unserializable)
            .run()
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(client.calls().is_empty());
    }
}
