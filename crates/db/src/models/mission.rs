//! Mission entity model and DTOs.

use chrono::NaiveDate;
use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `missions` table.
///
/// Missions are displayed in the manager-assigned `order_index` order (ties
/// broken by creation order), not by date.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mission {
    pub id: DbId,
    pub campaign_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub mission_date: NaiveDate,
    pub location: Option<String>,
    pub status: String,
    pub order_index: i64,
    pub map_edit_url: Option<String>,
    pub map_view_url: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new mission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMission {
    pub campaign_id: DbId,
    #[validate(length(min = 1, message = "mission name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub mission_date: NaiveDate,
    pub location: Option<String>,
    /// Validated against the mission status vocabulary.
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub order_index: i64,
    #[validate(url(message = "map edit link must be a valid URL"))]
    pub map_edit_url: Option<String>,
    #[validate(url(message = "map view link must be a valid URL"))]
    pub map_view_url: Option<String>,
}

fn default_status() -> String {
    muster_core::timeline::STATUS_PLANNED.to_string()
}

/// DTO for updating an existing mission. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMission {
    #[validate(length(min = 1, message = "mission name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub mission_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub order_index: Option<i64>,
    #[validate(url(message = "map edit link must be a valid URL"))]
    pub map_edit_url: Option<String>,
    #[validate(url(message = "map view link must be a valid URL"))]
    pub map_view_url: Option<String>,
}
