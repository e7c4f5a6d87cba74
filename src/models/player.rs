//! Player model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A player node (`:Player`).
///
/// Names are not unique; two players may share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier (ULID).
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Set on every rename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
