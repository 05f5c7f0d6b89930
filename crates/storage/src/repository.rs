use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use trivia_core::model::LeaderboardEntry;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Append-only store for final session scores.
///
/// No uniqueness constraint on names, no validation of score values; the
/// only supported read is the ranked top-N. Ties are stable with insertion
/// order.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Append one `(name, score)` row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn record(&self, name: &str, score: i64) -> Result<(), StorageError>;

    /// Fetch up to `limit` entries, ordered by score descending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on read failure.
    async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError>;
}

/// Simple in-memory score store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryScoreStore {
    rows: Arc<Mutex<Vec<LeaderboardEntry>>>,
}

impl InMemoryScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn record(&self, name: &str, score: i64) -> Result<(), StorageError> {
        let mut guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(LeaderboardEntry::new(name, score));
        Ok(())
    }

    async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut entries = guard.clone();
        // Stable sort keeps insertion order among tied scores.
        entries.sort_by_key(|e| std::cmp::Reverse(e.score));
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(entries)
    }
}

/// Aggregates the score store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            scores: Arc::new(InMemoryScoreStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn top_orders_by_score_descending() {
        let store = InMemoryScoreStore::new();
        store.record("A", 50).await.unwrap();
        store.record("B", 90).await.unwrap();
        store.record("C", 70).await.unwrap();

        let top = store.top(10).await.unwrap();
        let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let store = InMemoryScoreStore::new();
        store.record("first", 40).await.unwrap();
        store.record("second", 40).await.unwrap();

        let top = store.top(10).await.unwrap();
        assert_eq!(top[0].name, "first");
        assert_eq!(top[1].name, "second");
    }

    #[tokio::test]
    async fn record_accepts_any_score_value() {
        let store = InMemoryScoreStore::new();
        store.record("zero", 0).await.unwrap();
        store.record("negative", -5).await.unwrap();

        let top = store.top(10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].score, -5);
    }

    #[tokio::test]
    async fn top_respects_the_limit() {
        let store = InMemoryScoreStore::new();
        for i in 0..5 {
            store.record("p", i).await.unwrap();
        }
        let top = store.top(3).await.unwrap();
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].score, 4);
    }
}
