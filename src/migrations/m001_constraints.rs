//! Uniqueness constraints on node identifiers.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::AppError;
use crate::graph::CypherExecutor;
use crate::migrations::Migration;

/// Unique `id` on Player and Match nodes.
///
/// The constraints also back the `{id: $id}` lookups with an index.
pub struct M001Constraints;

impl Migration for M001Constraints {
    fn id(&self) -> &'static str {
        "m001_constraints"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "Unique id constraints on Player and Match"
    }

    fn up<'a>(&'a self, ctx: &'a (dyn CypherExecutor + 'a)) -> BoxFuture<'a, Result<(), AppError>> {
        async move {
            ctx.run_cypher(
                "CREATE CONSTRAINT player_id_unique IF NOT EXISTS
                 FOR (p:Player) REQUIRE p.id IS UNIQUE",
                Default::default(),
            )
            .await?;

            ctx.run_cypher(
                "CREATE CONSTRAINT match_id_unique IF NOT EXISTS
                 FOR (m:Match) REQUIRE m.id IS UNIQUE",
                Default::default(),
            )
            .await?;

            Ok(())
        }
        .boxed()
    }
}
