//! Player repository for the Player node lifecycle.

use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;

use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::graph::{Graph, GraphClient, QueryExt, Row};
use crate::models::{generate_ulid, Player};

/// Repository for creating, renaming, looking up and deleting players.
pub struct PlayerRepository<C: GraphClient = Neo4jClient> {
    graph: Arc<Graph<C>>,
}

// Derived Clone would require `C: Clone`.
impl<C: GraphClient> Clone for PlayerRepository<C> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
        }
    }
}

impl FromRef<Context> for PlayerRepository {
    fn from_ref(ctx: &Context) -> Self {
        Self::new(Arc::clone(&ctx.graph))
    }
}

impl<C: GraphClient> PlayerRepository<C> {
    pub fn new(graph: Arc<Graph<C>>) -> Self {
        Self { graph }
    }

    /// Create a new player.
    ///
    /// No validation is applied to `name`; empty and duplicate names are
    /// stored as given.
    pub async fn create(&self, name: &str) -> Result<Player, AppError> {
        let id = generate_ulid();
        let name = name.to_string();
        let now = Utc::now().to_rfc3339();

        let row = self
            .graph
            .write(move |txn| {
                async move {
                    txn.query(
                        "CREATE (p:Player {id: $id, name: $name, created_at: $now})
                         RETURN p.id AS id, p.name AS name,
                                p.created_at AS created_at, p.updated_at AS updated_at",
                    )
                    .param("id", &id)
                    .param("name", &name)
                    .param("now", &now)
                    .fetch_one()
                    .await
                }
                .boxed()
            })
            .await?
            .ok_or_else(|| AppError::Internal("CREATE Player returned no row".into()))?;

        let player = Self::row_to_player(&row)?;
        tracing::debug!(player_id = %player.id, "Created player");
        Ok(player)
    }

    /// Find a player by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Player>, AppError> {
        let row = self
            .graph
            .read(|client| {
                client
                    .query(
                        "MATCH (p:Player {id: $id})
                         RETURN p.id AS id, p.name AS name,
                                p.created_at AS created_at, p.updated_at AS updated_at",
                    )
                    .param("id", id)
                    .fetch_one()
                    .boxed()
            })
            .await?;

        row.as_ref().map(Self::row_to_player).transpose()
    }

    /// Find all players with exactly this name, oldest first.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Player>, AppError> {
        let rows = self
            .graph
            .read(|client| {
                client
                    .query(
                        "MATCH (p:Player {name: $name})
                         RETURN p.id AS id, p.name AS name,
                                p.created_at AS created_at, p.updated_at AS updated_at
                         ORDER BY p.created_at",
                    )
                    .param("name", name)
                    .fetch_all()
                    .boxed()
            })
            .await?;

        rows.iter().map(Self::row_to_player).collect()
    }

    /// Rename a player.
    ///
    /// Returns `Ok(None)` when no player has this ID; nothing is written.
    pub async fn update(&self, id: &str, new_name: &str) -> Result<Option<Player>, AppError> {
        let id = id.to_string();
        let new_name = new_name.to_string();
        let now = Utc::now().to_rfc3339();
        let player_id = id.clone();

        let row = self
            .graph
            .write(move |txn| {
                async move {
                    txn.query(
                        "MATCH (p:Player {id: $id})
                         SET p.name = $name, p.updated_at = $now
                         RETURN p.id AS id, p.name AS name,
                                p.created_at AS created_at, p.updated_at AS updated_at",
                    )
                    .param("id", &id)
                    .param("name", &new_name)
                    .param("now", &now)
                    .fetch_one()
                    .await
                }
                .boxed()
            })
            .await?;

        if row.is_none() {
            tracing::debug!(player_id = %player_id, "Rename matched no player");
        }
        row.as_ref().map(Self::row_to_player).transpose()
    }

    /// Delete a player and every relationship attached to it.
    ///
    /// Returns `false` when no player has this ID.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let id = id.to_string();
        let player_id = id.clone();

        let row = self
            .graph
            .write(move |txn| {
                async move {
                    txn.query(
                        "MATCH (p:Player {id: $id})
                         DETACH DELETE p
                         RETURN count(p) AS deleted",
                    )
                    .param("id", &id)
                    .fetch_one()
                    .await
                }
                .boxed()
            })
            .await?;

        let deleted = match row {
            Some(row) => row.get::<i64>("deleted")? > 0,
            None => false,
        };
        tracing::debug!(player_id = %player_id, deleted, "Delete player");
        Ok(deleted)
    }

    /// Convert a row to a Player.
    fn row_to_player(row: &Row) -> Result<Player, AppError> {
        Ok(Player {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get_opt("updated_at")?,
        })
    }
}
