use serde::{Deserialize, Serialize};

/// One leaderboard row: a player name and a final score.
///
/// Append-only by contract: the core never mutates or deletes entries, and
/// the store accepts any score value without validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i64,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}
