//! Campaign entity models and DTOs.

use chrono::NaiveDate;
use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `campaigns` table.
///
/// At most one campaign is active at any time. Once closed, a campaign is
/// immutable except for producing reports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub is_closed: bool,
    /// Editorial map link for managers.
    pub map_edit_url: Option<String>,
    /// Read-only map link for the public view.
    pub map_view_url: Option<String>,
    pub created_at: Timestamp,
}

impl Campaign {
    /// Lifecycle status string used in report exports.
    pub fn status(&self) -> &'static str {
        if self.is_closed {
            "closed"
        } else {
            "active"
        }
    }
}

/// DTO for creating a new campaign.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCampaign {
    #[validate(length(min = 1, message = "campaign name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    #[validate(url(message = "map edit link must be a valid URL"))]
    pub map_edit_url: Option<String>,
    #[validate(url(message = "map view link must be a valid URL"))]
    pub map_view_url: Option<String>,
    /// Activate the new campaign immediately, deactivating all others.
    #[serde(default)]
    pub set_active: bool,
}

/// DTO for updating an existing campaign. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCampaign {
    #[validate(length(min = 1, message = "campaign name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    #[validate(url(message = "map edit link must be a valid URL"))]
    pub map_edit_url: Option<String>,
    #[validate(url(message = "map view link must be a valid URL"))]
    pub map_view_url: Option<String>,
}

/// A row from the `library_imports` table.
///
/// Records that a library's assets were copied into a campaign's pool;
/// unique per (campaign, library) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LibraryImport {
    pub id: DbId,
    pub campaign_id: DbId,
    pub library_id: DbId,
    pub imported_at: Timestamp,
}
