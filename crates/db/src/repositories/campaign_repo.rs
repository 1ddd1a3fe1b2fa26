//! Repository for the `campaigns` and `library_imports` tables.
//!
//! Owns the campaign lifecycle: the single-active invariant, the one-way
//! close transition, and library imports into the asset pool.

use std::path::Path;

use chrono::Utc;
use muster_core::types::DbId;
use sqlx::sqlite::{SqliteConnection, SqlitePool};

use crate::error::{validate_input, StoreError, StoreResult};
use crate::models::campaign::{Campaign, CreateCampaign, LibraryImport, UpdateCampaign};
use crate::report;

/// Column list for `campaigns` queries.
pub(crate) const CAMPAIGN_COLUMNS: &str = "\
    id, name, description, start_date, end_date, \
    is_active, is_closed, map_edit_url, map_view_url, created_at";

/// Column list for `library_imports` queries.
const IMPORT_COLUMNS: &str = "id, campaign_id, library_id, imported_at";

/// Provides lifecycle and import operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Create a campaign. With `set_active`, every other campaign is
    /// deactivated in the same transaction so the single-active invariant
    /// holds throughout.
    pub async fn create(pool: &SqlitePool, input: &CreateCampaign) -> StoreResult<Campaign> {
        validate_input(input)?;

        let mut tx = pool.begin().await?;

        if input.set_active {
            sqlx::query("UPDATE campaigns SET is_active = 0 WHERE is_active = 1")
                .execute(&mut *tx)
                .await?;
        }

        let query = format!(
            "INSERT INTO campaigns \
                (name, description, start_date, is_active, map_edit_url, map_view_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.set_active)
            .bind(&input.map_edit_url)
            .bind(&input.map_view_url)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(campaign)
    }

    /// Update a campaign's attributes. Closed campaigns are immutable.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCampaign,
    ) -> StoreResult<Campaign> {
        validate_input(input)?;

        let mut tx = pool.begin().await?;
        fetch_open_campaign(&mut tx, id).await?;

        let query = format!(
            "UPDATE campaigns SET \
                name = COALESCE(?, name), \
                description = COALESCE(?, description), \
                start_date = COALESCE(?, start_date), \
                map_edit_url = COALESCE(?, map_edit_url), \
                map_view_url = COALESCE(?, map_view_url) \
             WHERE id = ? \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(&input.map_edit_url)
            .bind(&input.map_view_url)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(campaign)
    }

    /// Find a campaign by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> StoreResult<Option<Campaign>> {
        let query = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?");
        Ok(sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?)
    }

    /// List all campaigns, newest first.
    pub async fn list(pool: &SqlitePool) -> StoreResult<Vec<Campaign>> {
        let query =
            format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC, id DESC");
        Ok(sqlx::query_as::<_, Campaign>(&query).fetch_all(pool).await?)
    }

    /// The single currently-active campaign, if any. Closed campaigns are
    /// never returned here.
    pub async fn get_active(pool: &SqlitePool) -> StoreResult<Option<Campaign>> {
        let query = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE is_active = 1 AND is_closed = 0"
        );
        Ok(sqlx::query_as::<_, Campaign>(&query)
            .fetch_optional(pool)
            .await?)
    }

    /// Make a campaign the single active one.
    ///
    /// Clears every other campaign's flag and sets the target inside one
    /// transaction, so concurrent activations serialize and the last
    /// committed writer wins.
    pub async fn set_active(pool: &SqlitePool, id: DbId) -> StoreResult<Campaign> {
        let mut tx = pool.begin().await?;

        fetch_open_campaign(&mut tx, id).await?;

        sqlx::query("UPDATE campaigns SET is_active = 0 WHERE is_active = 1")
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE campaigns SET is_active = 1 WHERE id = ? RETURNING {CAMPAIGN_COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(campaign)
    }

    /// Close a campaign: a one-way transition that deactivates it, stamps
    /// the end date, and archives a closure snapshot.
    ///
    /// The snapshot write happens after the state change commits and is
    /// best-effort: a failure is logged and the close still succeeds.
    /// Returns the campaign and the snapshot filename when one was written.
    pub async fn close(
        pool: &SqlitePool,
        id: DbId,
        reports_dir: &Path,
    ) -> StoreResult<(Campaign, Option<String>)> {
        let mut tx = pool.begin().await?;

        let existing = fetch_campaign(&mut tx, id).await?;
        if existing.is_closed {
            return Err(StoreError::invalid_state("Campaign already closed"));
        }

        let query = format!(
            "UPDATE campaigns SET is_closed = 1, is_active = 0, end_date = ? \
             WHERE id = ? \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(Utc::now().date_naive())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let snapshot = match report::write_closure_snapshot(reports_dir, &campaign) {
            Ok(filename) => Some(filename),
            Err(err) => {
                tracing::warn!(campaign_id = id, error = %err, "closure snapshot write failed");
                None
            }
        };

        Ok((campaign, snapshot))
    }

    /// Import a library's assets into a campaign's pool.
    ///
    /// Rejected with `Conflict` if this (campaign, library) pair was
    /// already imported. Creates a pool entry seeded from each asset's
    /// default quantity; assets already pooled in the campaign are left
    /// untouched. Returns the number of entries created.
    pub async fn import_library(
        pool: &SqlitePool,
        campaign_id: DbId,
        library_id: DbId,
    ) -> StoreResult<u64> {
        let mut tx = pool.begin().await?;

        fetch_open_campaign(&mut tx, campaign_id).await?;

        let library_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM asset_libraries WHERE id = ?)")
                .bind(library_id)
                .fetch_one(&mut *tx)
                .await?;
        if !library_exists {
            return Err(StoreError::not_found("library", library_id));
        }

        let already_imported: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM library_imports WHERE campaign_id = ? AND library_id = ?)",
        )
        .bind(campaign_id)
        .bind(library_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_imported {
            return Err(StoreError::conflict(
                "Library already imported into this campaign",
            ));
        }

        sqlx::query(
            "INSERT INTO library_imports (campaign_id, library_id, imported_at) VALUES (?, ?, ?)",
        )
        .bind(campaign_id)
        .bind(library_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let created = sqlx::query(
            "INSERT INTO pool_entries \
                (campaign_id, asset_id, library_id, initial_quantity, current_quantity) \
             SELECT ?, a.id, a.library_id, a.default_quantity, a.default_quantity \
             FROM assets a \
             WHERE a.library_id = ? \
               AND NOT EXISTS (\
                   SELECT 1 FROM pool_entries pe \
                   WHERE pe.campaign_id = ? AND pe.asset_id = a.id)",
        )
        .bind(campaign_id)
        .bind(library_id)
        .bind(campaign_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(created)
    }

    /// List the libraries imported into a campaign, in import order.
    pub async fn imports_for_campaign(
        pool: &SqlitePool,
        campaign_id: DbId,
    ) -> StoreResult<Vec<LibraryImport>> {
        let query = format!(
            "SELECT {IMPORT_COLUMNS} FROM library_imports WHERE campaign_id = ? ORDER BY id"
        );
        Ok(sqlx::query_as::<_, LibraryImport>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await?)
    }
}

/// Fetch a campaign inside the caller's transaction, or `NotFound`.
pub(crate) async fn fetch_campaign(
    conn: &mut SqliteConnection,
    id: DbId,
) -> StoreResult<Campaign> {
    let query = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?");
    sqlx::query_as::<_, Campaign>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("campaign", id))
}

/// Fetch a campaign and reject mutation of a closed one.
pub(crate) async fn fetch_open_campaign(
    conn: &mut SqliteConnection,
    id: DbId,
) -> StoreResult<Campaign> {
    let campaign = fetch_campaign(conn, id).await?;
    if campaign.is_closed {
        return Err(StoreError::invalid_state(
            "Campaign is closed and can no longer be modified",
        ));
    }
    Ok(campaign)
}
