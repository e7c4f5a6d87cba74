//! Match model.
//!
//! A match is linked to its players by `(:Player)-[:PARTICIPATED_IN]->(:Match)`
//! edges created in the same transaction as the match node. The `result` is
//! free-form text and is never changed after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A match node (`:Match`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Unique identifier (ULID).
    pub id: String,
    /// Free-form description of the outcome (e.g. "Player 1 wins").
    pub result: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of creating a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedMatch {
    #[serde(flatten)]
    pub game: Match,
    /// Number of `PARTICIPATED_IN` edges created.
    ///
    /// Lower than the number of supplied player ids when some of them did
    /// not match a player.
    pub linked: usize,
}

impl CreatedMatch {
    /// Number of supplied player ids that matched no player.
    pub fn skipped(&self, requested: usize) -> usize {
        requested.saturating_sub(self.linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_match_serializes_flat() {
        let created = CreatedMatch {
            game: Match {
                id: "01HZX3".to_string(),
                result: "Player 1 wins".to_string(),
                created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
            },
            linked: 2,
        };

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["id"], "01HZX3");
        assert_eq!(json["result"], "Player 1 wins");
        assert_eq!(json["linked"], 2);
        assert_eq!(created.skipped(3), 1);
        assert_eq!(created.skipped(1), 0);
    }
}
