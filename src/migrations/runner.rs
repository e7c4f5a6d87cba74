//! Migration runner with version tracking.

use chrono::Utc;

use crate::error::AppError;
use crate::graph::{Graph, GraphClient};
use crate::migrations::create_register;

/// Result of running migrations.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Schema version before migrations ran.
    pub previous_version: u32,
    /// Schema version after migrations ran.
    pub current_version: u32,
    /// IDs of the migrations that were applied.
    pub applied_migrations: Vec<String>,
}

/// Run all pending migrations.
///
/// Each migration runs in its own transaction; the version is recorded
/// after each one commits, so a failure leaves the version at the last
/// migration that succeeded.
pub async fn run_migrations<C: GraphClient>(
    graph: &Graph<C>,
) -> Result<MigrationResult, AppError> {
    let previous_version = get_schema_version(graph).await?;
    let register = create_register();

    let (current_version, applied_migrations) = register
        .run_pending(graph.client(), previous_version, |version, id| {
            set_schema_version(graph, version, id)
        })
        .await?;

    Ok(MigrationResult {
        previous_version,
        current_version,
        applied_migrations,
    })
}

async fn get_schema_version<C: GraphClient>(graph: &Graph<C>) -> Result<u32, AppError> {
    let row = graph
        .query("MATCH (v:SchemaVersion {id: 1}) RETURN v.version AS version")
        .fetch_one()
        .await?;

    match row {
        Some(row) => Ok(row.get_opt::<u32>("version")?.unwrap_or(0)),
        None => Ok(0),
    }
}

async fn set_schema_version<C: GraphClient>(
    graph: &Graph<C>,
    version: u32,
    migration_id: &'static str,
) -> Result<(), AppError> {
    graph
        .query(
            "MERGE (v:SchemaVersion {id: 1})
             SET v.version = $version,
                 v.last_migration = $migration_id,
                 v.last_applied_at = $now",
        )
        .param("version", version)
        .param("migration_id", migration_id)
        .param("now", Utc::now().to_rfc3339())
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::graph::testing::MockClient;
    use crate::graph::Row;

    #[tokio::test]
    async fn test_fresh_graph_applies_all() {
        let client = MockClient::new();
        let graph = Graph::new(client.clone());

        let result = run_migrations(&graph).await.unwrap();

        assert_eq!(result.previous_version, 0);
        assert_eq!(result.current_version, 2);
        assert_eq!(
            result.applied_migrations,
            vec!["m001_constraints", "m002_player_name_index"]
        );
        assert_eq!(client.commits(), 2);

        let calls = client.calls();
        let schema: Vec<_> = calls.iter().filter(|c| c.in_transaction).collect();
        assert_eq!(schema.len(), 3);
        assert!(schema.iter().all(|c| c.cypher.contains("IF NOT EXISTS")));

        let versions: Vec<_> = calls
            .iter()
            .filter(|c| c.cypher.starts_with("MERGE (v:SchemaVersion"))
            .map(|c| c.params["version"].clone())
            .collect();
        assert_eq!(versions, vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn test_up_to_date_graph_applies_nothing() {
        let client = MockClient::new();
        client.respond(vec![Row::from_pairs([("version", json!(2))])]);
        let graph = Graph::new(client.clone());

        let result = run_migrations(&graph).await.unwrap();

        assert_eq!(result.previous_version, 2);
        assert_eq!(result.current_version, 2);
        assert!(result.applied_migrations.is_empty());
        assert_eq!(client.begins(), 0);
    }

    #[tokio::test]
    async fn test_failed_migration_rolls_back_and_stops() {
        let client = MockClient::new();
        client.respond(vec![Row::from_pairs([("version", json!(1))])]);
        client.fail("Neo.ClientError.Schema.IndexAlreadyExists");
        let graph = Graph::new(client.clone());

        let result = run_migrations(&graph).await;

        assert!(matches!(result, Err(AppError::Query { .. })));
        assert_eq!(client.rollbacks(), 1);
        assert!(!client
            .calls()
            .iter()
            .any(|c| c.cypher.starts_with("MERGE (v:SchemaVersion")));
    }

    #[test]
    fn test_register_versions_are_ordered() {
        let register = create_register();
        let versions: Vec<u32> = register.iter().map(|m| m.version()).collect();
        assert_eq!(versions, vec![1, 2]);
    }
}
