use chrono::Utc;
use sqlx::Row;

use trivia_core::model::LeaderboardEntry;

use super::SqliteRepository;
use crate::repository::{ScoreStore, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn map_entry_row(row: &sqlx::sqlite::SqliteRow) -> Result<LeaderboardEntry, StorageError> {
    let name: String = row.try_get("name").map_err(ser)?;
    let score: i64 = row.try_get("score").map_err(ser)?;
    Ok(LeaderboardEntry::new(name, score))
}

#[async_trait::async_trait]
impl ScoreStore for SqliteRepository {
    async fn record(&self, name: &str, score: i64) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO leaderboard (name, score, recorded_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(name)
        .bind(score)
        .bind(Utc::now())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        // `id ASC` keeps tied scores stable with insertion order.
        let rows = sqlx::query(
            r"
                SELECT name, score
                FROM leaderboard
                ORDER BY score DESC, id ASC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_entry_row(&row)?);
        }

        Ok(out)
    }
}
