//! Init command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::migrations::run_migrations;

/// Run the init command to apply schema migrations.
pub async fn run_init() -> Result<()> {
    let config = Config::load()?;
    let ctx = Context::from(config).await?;

    tracing::info!("Running migrations...");
    let result = run_migrations(ctx.graph.as_ref())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Migration failed: {}", e))?;

    if result.applied_migrations.is_empty() {
        tracing::info!(
            "Graph already at v{}, no migrations needed",
            result.current_version
        );
    } else {
        tracing::info!(
            "Migrations complete: v{} -> v{}, applied: {:?}",
            result.previous_version,
            result.current_version,
            result.applied_migrations
        );
    }

    Ok(())
}
