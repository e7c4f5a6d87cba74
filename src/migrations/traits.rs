//! Migration trait and registry.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::graph::{CypherExecutor, GraphClient, Transaction as _};

/// A forward-only schema migration.
///
/// Uses BoxFuture to keep the trait object-safe.
pub trait Migration: Send + Sync {
    fn id(&self) -> &'static str;
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up<'a>(&'a self, ctx: &'a (dyn CypherExecutor + 'a)) -> BoxFuture<'a, Result<(), AppError>>;
}

/// Ordered list of migrations.
#[derive(Default)]
pub struct Register {
    migrations: Vec<Box<dyn Migration>>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Run every migration above `current_version`, each in its own
    /// transaction.
    ///
    /// `on_applied` runs after each commit, outside the transaction. Neo4j
    /// refuses schema and data writes in the same transaction, so version
    /// bookkeeping cannot share the migration's transaction.
    pub async fn run_pending<C, F, Fut>(
        &self,
        client: &C,
        current_version: u32,
        mut on_applied: F,
    ) -> Result<(u32, Vec<String>), AppError>
    where
        C: GraphClient,
        F: FnMut(u32, &'static str) -> Fut,
        Fut: std::future::Future<Output = Result<(), AppError>>,
    {
        let mut applied = vec![];
        let mut new_version = current_version;

        for migration in self.iter() {
            if migration.version() <= current_version {
                continue;
            }

            tracing::info!(
                "Applying migration {} (v{}): {}",
                migration.id(),
                migration.version(),
                migration.description()
            );

            let txn = client.begin().await?;
            match migration.up(&txn).await {
                Ok(()) => txn.commit().await?,
                Err(e) => {
                    tracing::error!("Migration {} failed: {}", migration.id(), e);
                    txn.rollback().await?;
                    return Err(e);
                }
            }

            on_applied(migration.version(), migration.id()).await?;
            new_version = migration.version();
            applied.push(migration.id().to_string());
        }

        Ok((new_version, applied))
    }
}
