//! Event and quantity-change entity models and DTOs.

use chrono::NaiveDateTime;
use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub mission_id: DbId,
    pub event_type: String,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDateTime,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEvent {
    /// Validated against the event type vocabulary.
    pub event_type: String,
    #[validate(length(min = 1, message = "event title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDateTime,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// DTO for updating an existing event. All fields are optional; quantity
/// changes are managed through their own operations.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEvent {
    pub event_type: Option<String>,
    #[validate(length(min = 1, message = "event title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// A row from the `quantity_changes` table.
///
/// The atomic unit that mutates a pool entry's current quantity. Positive
/// deltas are gains, negative are losses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuantityChange {
    pub id: DbId,
    pub event_id: DbId,
    pub asset_id: DbId,
    pub quantity_change: i64,
    pub notes: Option<String>,
}

/// One line of an event-creation form.
///
/// Lines with no asset selected or a zero delta are skipped entirely, not
/// persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeLine {
    pub asset_id: Option<DbId>,
    #[serde(default)]
    pub quantity_change: i64,
    pub notes: Option<String>,
}
