//! Asset library entity model and DTOs.

use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `asset_libraries` table.
///
/// A library owns a set of assets that can be imported wholesale into a
/// campaign's pool. Names are globally unique.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetLibrary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Default libraries are offered up-front when a campaign is created.
    pub is_default: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new library.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLibrary {
    #[validate(length(min = 1, message = "library name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// DTO for updating an existing library. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLibrary {
    #[validate(length(min = 1, message = "library name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_default: Option<bool>,
}
