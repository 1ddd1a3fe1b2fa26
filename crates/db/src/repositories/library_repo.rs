//! Repository for the `asset_libraries` and `assets` tables.
//!
//! The catalog is independent of campaigns: deleting is refused while a
//! campaign pool still references the target, and library deletion cascades
//! to its assets.

use chrono::Utc;
use muster_core::types::DbId;
use sqlx::sqlite::SqlitePool;

use crate::error::{validate_input, StoreError, StoreResult};
use crate::models::asset::{Asset, CopyOutcome, CreateAsset, UpdateAsset};
use crate::models::library::{AssetLibrary, CreateLibrary, UpdateLibrary};

/// Column list for `asset_libraries` queries.
const LIBRARY_COLUMNS: &str = "id, name, description, category, is_default, created_at";

/// Column list for `assets` queries.
pub(crate) const ASSET_COLUMNS: &str = "\
    id, library_id, name, asset_type, category, description, \
    default_quantity, is_unique, show_in_public, created_at";

/// Provides CRUD operations for the asset catalog.
pub struct LibraryRepo;

impl LibraryRepo {
    // -----------------------------------------------------------------------
    // Libraries
    // -----------------------------------------------------------------------

    /// Create a library. Names are globally unique.
    pub async fn create_library(
        pool: &SqlitePool,
        input: &CreateLibrary,
    ) -> StoreResult<AssetLibrary> {
        validate_input(input)?;

        let name_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM asset_libraries WHERE name = ?)")
                .bind(&input.name)
                .fetch_one(pool)
                .await?;
        if name_taken {
            return Err(StoreError::conflict(format!(
                "Library name '{}' already in use",
                input.name
            )));
        }

        let query = format!(
            "INSERT INTO asset_libraries (name, description, category, is_default, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {LIBRARY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, AssetLibrary>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.is_default)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?)
    }

    /// Update a library's attributes.
    pub async fn update_library(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateLibrary,
    ) -> StoreResult<AssetLibrary> {
        validate_input(input)?;

        let existing = Self::find_library(pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("library", id))?;

        if let Some(name) = &input.name {
            if *name != existing.name {
                let name_taken: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM asset_libraries WHERE name = ? AND id != ?)",
                )
                .bind(name)
                .bind(id)
                .fetch_one(pool)
                .await?;
                if name_taken {
                    return Err(StoreError::conflict(format!(
                        "Library name '{name}' already in use"
                    )));
                }
            }
        }

        let query = format!(
            "UPDATE asset_libraries SET \
                name = COALESCE(?, name), \
                description = COALESCE(?, description), \
                category = COALESCE(?, category), \
                is_default = COALESCE(?, is_default) \
             WHERE id = ? \
             RETURNING {LIBRARY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, AssetLibrary>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.is_default)
            .bind(id)
            .fetch_one(pool)
            .await?)
    }

    /// Delete a library, cascading to its assets.
    ///
    /// Refused with `Conflict` while any campaign has imported the library
    /// or still pools one of its assets.
    pub async fn delete_library(pool: &SqlitePool, id: DbId) -> StoreResult<()> {
        let library = Self::find_library(pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("library", id))?;

        let import_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM library_imports WHERE library_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await?;
        if import_count > 0 {
            return Err(StoreError::conflict(format!(
                "Cannot delete '{}': imported by {import_count} campaign(s)",
                library.name
            )));
        }

        let pooled_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pool_entries pe \
             JOIN assets a ON a.id = pe.asset_id \
             WHERE a.library_id = ?",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        if pooled_count > 0 {
            return Err(StoreError::conflict(format!(
                "Cannot delete '{}': its assets are pooled in {pooled_count} campaign entry(ies)",
                library.name
            )));
        }

        sqlx::query("DELETE FROM asset_libraries WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Find a library by ID.
    pub async fn find_library(pool: &SqlitePool, id: DbId) -> StoreResult<Option<AssetLibrary>> {
        let query = format!("SELECT {LIBRARY_COLUMNS} FROM asset_libraries WHERE id = ?");
        Ok(sqlx::query_as::<_, AssetLibrary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?)
    }

    /// List all libraries ordered by name.
    pub async fn list_libraries(pool: &SqlitePool) -> StoreResult<Vec<AssetLibrary>> {
        let query = format!("SELECT {LIBRARY_COLUMNS} FROM asset_libraries ORDER BY name");
        Ok(sqlx::query_as::<_, AssetLibrary>(&query)
            .fetch_all(pool)
            .await?)
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    /// Create an asset. Names are unique within a library.
    pub async fn create_asset(pool: &SqlitePool, input: &CreateAsset) -> StoreResult<Asset> {
        validate_input(input)?;

        let library_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM asset_libraries WHERE id = ?)")
                .bind(input.library_id)
                .fetch_one(pool)
                .await?;
        if !library_exists {
            return Err(StoreError::not_found("library", input.library_id));
        }

        let name_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM assets WHERE library_id = ? AND name = ?)",
        )
        .bind(input.library_id)
        .bind(&input.name)
        .fetch_one(pool)
        .await?;
        if name_taken {
            return Err(StoreError::conflict(format!(
                "Asset '{}' already exists in this library",
                input.name
            )));
        }

        let query = format!(
            "INSERT INTO assets \
                (library_id, name, asset_type, category, description, \
                 default_quantity, is_unique, show_in_public, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {ASSET_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Asset>(&query)
            .bind(input.library_id)
            .bind(&input.name)
            .bind(&input.asset_type)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.default_quantity)
            .bind(input.is_unique)
            .bind(input.show_in_public)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?)
    }

    /// Update an asset's attributes.
    pub async fn update_asset(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateAsset,
    ) -> StoreResult<Asset> {
        validate_input(input)?;

        let existing = Self::find_asset(pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("asset", id))?;

        if let Some(name) = &input.name {
            if *name != existing.name {
                let name_taken: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM assets \
                     WHERE library_id = ? AND name = ? AND id != ?)",
                )
                .bind(existing.library_id)
                .bind(name)
                .bind(id)
                .fetch_one(pool)
                .await?;
                if name_taken {
                    return Err(StoreError::conflict(format!(
                        "Asset '{name}' already exists in this library"
                    )));
                }
            }
        }

        let query = format!(
            "UPDATE assets SET \
                name = COALESCE(?, name), \
                asset_type = COALESCE(?, asset_type), \
                category = COALESCE(?, category), \
                description = COALESCE(?, description), \
                default_quantity = COALESCE(?, default_quantity), \
                is_unique = COALESCE(?, is_unique), \
                show_in_public = COALESCE(?, show_in_public) \
             WHERE id = ? \
             RETURNING {ASSET_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Asset>(&query)
            .bind(&input.name)
            .bind(&input.asset_type)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.default_quantity)
            .bind(input.is_unique)
            .bind(input.show_in_public)
            .bind(id)
            .fetch_one(pool)
            .await?)
    }

    /// Delete an asset. Refused with `Conflict` while any campaign pool
    /// references it.
    pub async fn delete_asset(pool: &SqlitePool, id: DbId) -> StoreResult<()> {
        let asset = Self::find_asset(pool, id)
            .await?
            .ok_or_else(|| StoreError::not_found("asset", id))?;

        let pooled_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pool_entries WHERE asset_id = ?")
                .bind(id)
                .fetch_one(pool)
                .await?;
        if pooled_count > 0 {
            return Err(StoreError::conflict(format!(
                "Cannot delete '{}': pooled in {pooled_count} campaign(s)",
                asset.name
            )));
        }

        sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Find an asset by ID.
    pub async fn find_asset(pool: &SqlitePool, id: DbId) -> StoreResult<Option<Asset>> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?");
        Ok(sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?)
    }

    /// List every asset in the catalog ordered by name.
    pub async fn list_assets(pool: &SqlitePool) -> StoreResult<Vec<Asset>> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets ORDER BY name, id");
        Ok(sqlx::query_as::<_, Asset>(&query).fetch_all(pool).await?)
    }

    /// List a library's assets ordered by name.
    pub async fn list_assets_in_library(
        pool: &SqlitePool,
        library_id: DbId,
    ) -> StoreResult<Vec<Asset>> {
        let query =
            format!("SELECT {ASSET_COLUMNS} FROM assets WHERE library_id = ? ORDER BY name");
        Ok(sqlx::query_as::<_, Asset>(&query)
            .bind(library_id)
            .fetch_all(pool)
            .await?)
    }

    /// Copy assets into another library.
    ///
    /// A source whose name already exists in the target is skipped, not an
    /// error; missing source ids are counted as skipped too. Runs in one
    /// transaction so a partial copy never survives a failure.
    pub async fn copy_assets(
        pool: &SqlitePool,
        source_asset_ids: &[DbId],
        target_library_id: DbId,
    ) -> StoreResult<CopyOutcome> {
        let target_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM asset_libraries WHERE id = ?)")
                .bind(target_library_id)
                .fetch_one(pool)
                .await?;
        if !target_exists {
            return Err(StoreError::not_found("library", target_library_id));
        }

        let mut tx = pool.begin().await?;
        let mut outcome = CopyOutcome::default();

        for &source_id in source_asset_ids {
            let select = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?");
            let source = sqlx::query_as::<_, Asset>(&select)
                .bind(source_id)
                .fetch_optional(&mut *tx)
                .await?;
            let Some(source) = source else {
                outcome.skipped += 1;
                continue;
            };

            let name_taken: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM assets WHERE library_id = ? AND name = ?)",
            )
            .bind(target_library_id)
            .bind(&source.name)
            .fetch_one(&mut *tx)
            .await?;
            if name_taken {
                outcome.skipped += 1;
                continue;
            }

            sqlx::query(
                "INSERT INTO assets \
                    (library_id, name, asset_type, category, description, \
                     default_quantity, is_unique, show_in_public, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(target_library_id)
            .bind(&source.name)
            .bind(&source.asset_type)
            .bind(&source.category)
            .bind(&source.description)
            .bind(source.default_quantity)
            .bind(source.is_unique)
            .bind(source.show_in_public)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
            outcome.imported += 1;
        }

        tx.commit().await?;
        Ok(outcome)
    }
}
