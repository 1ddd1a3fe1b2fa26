//! Repository for the `logs` table.
//!
//! The audit trail is append-only: entries are never updated or deleted,
//! and they sit outside the pool accounting invariants.

use chrono::Utc;
use muster_core::types::DbId;
use sqlx::sqlite::SqlitePool;

use crate::error::{validate_input, StoreResult};
use crate::models::log::{CreateLog, LogEntry};

/// Column list for `logs` queries.
const COLUMNS: &str = "id, campaign_id, user_id, action, details, created_at";

/// Provides append/read operations for the audit trail.
pub struct LogRepo;

impl LogRepo {
    /// Append a log entry.
    pub async fn append(pool: &SqlitePool, input: &CreateLog) -> StoreResult<LogEntry> {
        validate_input(input)?;

        let query = format!(
            "INSERT INTO logs (campaign_id, user_id, action, details, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, LogEntry>(&query)
            .bind(input.campaign_id)
            .bind(input.user_id)
            .bind(&input.action)
            .bind(&input.details)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?)
    }

    /// List a campaign's log entries oldest first.
    pub async fn list_for_campaign(
        pool: &SqlitePool,
        campaign_id: DbId,
    ) -> StoreResult<Vec<LogEntry>> {
        let query = format!(
            "SELECT {COLUMNS} FROM logs WHERE campaign_id = ? ORDER BY created_at, id"
        );
        Ok(sqlx::query_as::<_, LogEntry>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await?)
    }
}
