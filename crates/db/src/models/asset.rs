//! Asset entity model and DTOs.

use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `assets` table.
///
/// An asset belongs to exactly one library; its name is unique within that
/// library. `default_quantity` seeds the pool entry when the asset is
/// imported into a campaign.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub library_id: DbId,
    pub name: String,
    pub asset_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub default_quantity: i64,
    pub is_unique: bool,
    pub show_in_public: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new asset.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAsset {
    pub library_id: DbId,
    #[validate(length(min = 1, message = "asset name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "asset type must not be empty"))]
    pub asset_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_one")]
    #[validate(range(min = 0, message = "default quantity must not be negative"))]
    pub default_quantity: i64,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default = "default_true")]
    pub show_in_public: bool,
}

fn default_one() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

/// DTO for updating an existing asset. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 1, message = "asset name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "asset type must not be empty"))]
    pub asset_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "default quantity must not be negative"))]
    pub default_quantity: Option<i64>,
    pub is_unique: Option<bool>,
    pub show_in_public: Option<bool>,
}

/// Result of copying assets between libraries.
///
/// Sources whose name already exists in the target library are skipped, not
/// errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CopyOutcome {
    pub imported: u32,
    pub skipped: u32,
}
