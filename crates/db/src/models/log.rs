//! Audit log entity model and DTO.
//!
//! Log entries are append-only; there is no update path.

use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `logs` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogEntry {
    pub id: DbId,
    pub campaign_id: Option<DbId>,
    /// External identity reference; users live outside this store.
    pub user_id: Option<DbId>,
    pub action: String,
    pub details: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a log entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLog {
    pub campaign_id: Option<DbId>,
    pub user_id: Option<DbId>,
    #[validate(length(min = 1, message = "log action must not be empty"))]
    pub action: String,
    pub details: Option<String>,
}
