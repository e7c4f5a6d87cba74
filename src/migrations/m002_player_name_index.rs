//! Index for player lookups by name.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::AppError;
use crate::graph::CypherExecutor;
use crate::migrations::Migration;

pub struct M002PlayerNameIndex;

impl Migration for M002PlayerNameIndex {
    fn id(&self) -> &'static str {
        "m002_player_name_index"
    }

    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Index on Player.name (names are not unique)"
    }

    fn up<'a>(&'a self, ctx: &'a (dyn CypherExecutor + 'a)) -> BoxFuture<'a, Result<(), AppError>> {
        async move {
            ctx.run_cypher(
                "CREATE INDEX player_name IF NOT EXISTS FOR (p:Player) ON (p.name)",
                Default::default(),
            )
            .await
        }
        .boxed()
    }
}
