//! Schema migrations for the Neo4j graph with version tracking.
//!
//! Migrations are:
//! - **Idempotent**: every statement uses `IF NOT EXISTS`
//! - **Forward-only**: no rollback support; add a compensating migration instead
//! - **Version-tracked**: the version lives on a single `(:SchemaVersion {id: 1})` node
//! - **Applied by `matchgraph init`**

mod m001_constraints;
mod m002_player_name_index;
mod runner;
mod traits;

pub use m001_constraints::M001Constraints;
pub use m002_player_name_index::M002PlayerNameIndex;
pub use runner::{run_migrations, MigrationResult};
pub use traits::{Migration, Register};

/// All migrations in version order.
pub fn create_register() -> Register {
    Register::new()
        .register(M001Constraints)
        .register(M002PlayerNameIndex)
}
