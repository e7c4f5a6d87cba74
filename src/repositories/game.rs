//! Match repository: atomic match creation with participation links, and
//! read-only lookups.

use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;

use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::{Graph, GraphClient, QueryExt, Row};
use crate::models::{generate_ulid, CreatedMatch, Match};

/// Repository for Match nodes and their `PARTICIPATED_IN` edges.
pub struct MatchRepository<C: GraphClient = Neo4jClient> {
    graph: Arc<Graph<C>>,
}

// Derived Clone would require `C: Clone`.
impl<C: GraphClient> Clone for MatchRepository<C> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
        }
    }
}

impl FromRef<Context> for MatchRepository {
    fn from_ref(ctx: &Context) -> Self {
        Self::new(Arc::clone(&ctx.graph))
    }
}

impl<C: GraphClient> MatchRepository<C> {
    pub fn new(graph: Arc<Graph<C>>) -> Self {
        Self { graph }
    }

    /// Create a match and link every listed player to it, in one transaction.
    ///
    /// One edge is created per entry of `player_ids`, so duplicates give
    /// duplicate edges. IDs with no matching player are skipped without error;
    /// the returned `linked` count tells how many edges were created.
    pub async fn create(
        &self,
        result: &str,
        player_ids: &[String],
    ) -> Result<CreatedMatch, AppError> {
        let created_at = Utc::now();
        let game = Match {
            id: generate_ulid(),
            result: result.to_string(),
            created_at,
        };

        let id = game.id.clone();
        let outcome = game.result.clone();
        let players = player_ids.to_vec();
        let now = created_at.to_rfc3339();

        // count(p) with no grouping key yields one row even when nothing
        // was linked, including an empty player list.
        let row = self
            .graph
            .write(move |txn| {
                async move {
                    txn.query(
                        "CREATE (m:Match {id: $id, result: $result, created_at: $now})
                         WITH m
                         UNWIND $players AS player_id
                         MATCH (p:Player {id: player_id})
                         CREATE (p)-[:PARTICIPATED_IN]->(m)
                         RETURN count(p) AS linked",
                    )
                    .param("id", &id)
                    .param("result", &outcome)
                    .param("now", &now)
                    .param("players", &players)
                    .fetch_one()
                    .await
                }
                .boxed()
            })
            .await?;

        let linked = match row {
            Some(row) => usize::try_from(row.get::<i64>("linked")?).unwrap_or_default(),
            None => 0,
        };

        let created = CreatedMatch { game, linked };
        let skipped = created.skipped(player_ids.len());
        if skipped > 0 {
            tracing::warn!(
                match_id = %created.game.id,
                requested = player_ids.len(),
                linked,
                "Some player ids matched no player and were skipped"
            );
        } else {
            tracing::debug!(match_id = %created.game.id, linked, "Created match");
        }

        Ok(created)
    }

    /// Look up the recorded result of a match.
    ///
    /// Returns `Ok(None)` when no match has this ID.
    pub async fn get_result(&self, id: &str) -> Result<Option<String>, AppError> {
        let row = self
            .graph
            .read(|client| {
                client
                    .query("MATCH (m:Match {id: $id}) RETURN m.result AS result")
                    .param("id", id)
                    .fetch_one()
                    .boxed()
            })
            .await?;

        row.map(|row| row.get("result")).transpose()
    }

    /// Find a match by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Match>, AppError> {
        let row = self
            .graph
            .read(|client| {
                client
                    .query(
                        "MATCH (m:Match {id: $id})
                         RETURN m.id AS id, m.result AS result, m.created_at AS created_at",
                    )
                    .param("id", id)
                    .fetch_one()
                    .boxed()
            })
            .await?;

        row.as_ref().map(Self::row_to_match).transpose()
    }

    /// Player IDs linked to a match, one entry per `PARTICIPATED_IN` edge.
    pub async fn participants(&self, id: &str) -> Result<Vec<String>, AppError> {
        let rows = self
            .graph
            .read(|client| {
                client
                    .query(
                        "MATCH (p:Player)-[:PARTICIPATED_IN]->(m:Match {id: $id})
                         RETURN p.id AS player_id
                         ORDER BY player_id",
                    )
                    .param("id", id)
                    .fetch_all()
                    .boxed()
            })
            .await?;

        rows.iter().map(|row| row.get("player_id")).collect()
    }

    /// Matches a player took part in, newest first.
    pub async fn list_for_player(&self, player_id: &str) -> Result<Vec<Match>, AppError> {
        let rows = self
            .graph
            .read(|client| {
                client
                    .query(
                        "MATCH (:Player {id: $player_id})-[:PARTICIPATED_IN]->(m:Match)
                         RETURN DISTINCT m.id AS id, m.result AS result, m.created_at AS created_at
                         ORDER BY created_at DESC",
                    )
                    .param("player_id", player_id)
                    .fetch_all()
                    .boxed()
            })
            .await?;

        rows.iter().map(Self::row_to_match).collect()
    }

    fn row_to_match(row: &Row) -> Result<Match, AppError> {
        Ok(Match {
            id: row.get("id")?,
            result: row.get("result")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::graph::testing::MockClient;

    fn repo() -> (MockClient, MatchRepository<MockClient>) {
        let client = MockClient::new();
        let repo = MatchRepository::new(Arc::new(Graph::new(client.clone())));
        (client, repo)
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_links_players_in_one_statement() {
        let (client, repo) = repo();
        client.respond(vec![Row::from_pairs([("linked", json!(2))])]);

        let created = repo
            .create("Player 1 wins", &ids(&["p1", "p2"]))
            .await
            .unwrap();

        assert_eq!(created.game.result, "Player 1 wins");
        assert_eq!(created.linked, 2);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].in_transaction);
        assert!(calls[0].cypher.contains("CREATE (m:Match"));
        assert!(calls[0].cypher.contains("CREATE (p)-[:PARTICIPATED_IN]->(m)"));
        assert_eq!(calls[0].params["id"], json!(created.game.id));
        assert_eq!(calls[0].params["players"], json!(["p1", "p2"]));
        assert_eq!(client.commits(), 1);
    }

    #[tokio::test]
    async fn test_create_keeps_duplicate_players() {
        let (client, repo) = repo();
        client.respond(vec![Row::from_pairs([("linked", json!(2))])]);

        let created = repo.create("Draw", &ids(&["p1", "p1"])).await.unwrap();

        assert_eq!(client.calls()[0].params["players"], json!(["p1", "p1"]));
        assert_eq!(created.linked, 2);
    }

    #[tokio::test]
    async fn test_create_reports_skipped_players() {
        let (client, repo) = repo();
        client.respond(vec![Row::from_pairs([("linked", json!(1))])]);

        let created = repo
            .create("Player 1 wins", &ids(&["p1", "missing"]))
            .await
            .unwrap();

        assert_eq!(created.linked, 1);
        assert_eq!(created.skipped(2), 1);
    }

    #[tokio::test]
    async fn test_create_without_players() {
        let (client, repo) = repo();
        client.respond(vec![Row::from_pairs([("linked", json!(0))])]);

        let created = repo.create("Abandoned", &[]).await.unwrap();

        assert_eq!(created.linked, 0);
        assert_eq!(client.calls()[0].params["players"], json!([]));
    }

    #[tokio::test]
    async fn test_create_failure_rolls_back() {
        let (client, repo) = repo();
        client.fail("TransientError");

        let result = repo.create("Player 1 wins", &ids(&["p1"])).await;

        assert!(matches!(result, Err(AppError::Query { .. })));
        assert_eq!(client.rollbacks(), 1);
        assert_eq!(client.commits(), 0);
    }

    #[tokio::test]
    async fn test_get_result_found() {
        let (client, repo) = repo();
        client.respond(vec![Row::from_pairs([("result", json!("Player 2 wins"))])]);

        let result = repo.get_result("m1").await.unwrap();

        assert_eq!(result.as_deref(), Some("Player 2 wins"));
        assert_eq!(client.calls()[0].params["id"], json!("m1"));
    }

    #[tokio::test]
    async fn test_get_result_missing_is_none() {
        let (_client, repo) = repo();
        assert_eq!(repo.get_result("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_participants_one_entry_per_edge() {
        let (client, repo) = repo();
        client.respond(vec![
            Row::from_pairs([("player_id", json!("p1"))]),
            Row::from_pairs([("player_id", json!("p1"))]),
        ]);

        let players = repo.participants("m1").await.unwrap();
        assert_eq!(players, vec!["p1", "p1"]);
    }

    #[tokio::test]
    async fn test_list_for_player() {
        let (client, repo) = repo();
        client.respond(vec![Row::from_pairs([
            ("id", json!("m1")),
            ("result", json!("Player 1 wins")),
            ("created_at", json!("2024-05-01T12:00:00+00:00")),
        ])]);

        let matches = repo.list_for_player("p1").await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "m1");
        assert_eq!(client.calls()[0].params["player_id"], json!("p1"));
    }
}
