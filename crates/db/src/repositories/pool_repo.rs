//! Repository for the `pool_entries` table -- the campaign asset pool.
//!
//! Each entry is a little state machine over `current_quantity`, transitioned
//! only by the operations here and never allowed to go negative. Every
//! mutation runs inside a transaction scoped to the single entry so
//! concurrent events on the same asset serialize; the read-modify-write of
//! `current_quantity` is never split across a race window.

use muster_core::accounting;
use muster_core::types::DbId;
use sqlx::sqlite::{SqliteConnection, SqlitePool};

use crate::error::{StoreError, StoreResult};
use crate::models::asset::Asset;
use crate::models::pool::PoolEntry;
use crate::repositories::campaign_repo::fetch_open_campaign;
use crate::repositories::library_repo::ASSET_COLUMNS;

/// Column list for `pool_entries` queries.
const COLUMNS: &str = "id, campaign_id, asset_id, library_id, initial_quantity, current_quantity";

/// Provides quantity-tracking operations for campaign pools.
pub struct PoolRepo;

impl PoolRepo {
    /// Add an asset to a campaign's pool with `initial = current = quantity`.
    ///
    /// The entry's source library is the asset's own library. Rejected with
    /// `Conflict` if the (campaign, asset) pair is already pooled.
    pub async fn add_entry(
        pool: &SqlitePool,
        campaign_id: DbId,
        asset_id: DbId,
        quantity: i64,
    ) -> StoreResult<PoolEntry> {
        if quantity < 0 {
            return Err(StoreError::validation("Quantity must not be negative"));
        }

        let mut tx = pool.begin().await?;

        fetch_open_campaign(&mut tx, campaign_id).await?;

        let select = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?");
        let asset = sqlx::query_as::<_, Asset>(&select)
            .bind(asset_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("asset", asset_id))?;

        let already_pooled: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pool_entries WHERE campaign_id = ? AND asset_id = ?)",
        )
        .bind(campaign_id)
        .bind(asset_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_pooled {
            return Err(StoreError::conflict("Asset already in campaign pool"));
        }

        let query = format!(
            "INSERT INTO pool_entries \
                (campaign_id, asset_id, library_id, initial_quantity, current_quantity) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, PoolEntry>(&query)
            .bind(campaign_id)
            .bind(asset_id)
            .bind(asset.library_id)
            .bind(quantity)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Remove an entry from its campaign's pool.
    ///
    /// Deletes unconditionally with respect to history: quantity changes
    /// that referenced the asset survive independently.
    pub async fn remove_entry(pool: &SqlitePool, entry_id: DbId) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        let entry = fetch_entry(&mut tx, entry_id).await?;
        fetch_open_campaign(&mut tx, entry.campaign_id).await?;

        sqlx::query("DELETE FROM pool_entries WHERE id = ?")
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Rebase an entry's starting quantity.
    ///
    /// `current` shifts by the same difference so the net effect of all
    /// applied deltas is preserved, then re-clamps at zero.
    pub async fn set_initial_quantity(
        pool: &SqlitePool,
        entry_id: DbId,
        new_initial: i64,
    ) -> StoreResult<PoolEntry> {
        if new_initial < 0 {
            return Err(StoreError::validation("Quantity must not be negative"));
        }

        let mut tx = pool.begin().await?;

        let entry = fetch_entry(&mut tx, entry_id).await?;
        fetch_open_campaign(&mut tx, entry.campaign_id).await?;

        let current = accounting::rebase_current(
            entry.current_quantity,
            entry.initial_quantity,
            new_initial,
        );

        let query = format!(
            "UPDATE pool_entries SET initial_quantity = ?, current_quantity = ? \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, PoolEntry>(&query)
            .bind(new_initial)
            .bind(current)
            .bind(entry_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Find an entry by ID.
    pub async fn find_entry(pool: &SqlitePool, entry_id: DbId) -> StoreResult<Option<PoolEntry>> {
        let query = format!("SELECT {COLUMNS} FROM pool_entries WHERE id = ?");
        Ok(sqlx::query_as::<_, PoolEntry>(&query)
            .bind(entry_id)
            .fetch_optional(pool)
            .await?)
    }

    /// Find the entry for a (campaign, asset) pair.
    pub async fn entry_for_asset(
        pool: &SqlitePool,
        campaign_id: DbId,
        asset_id: DbId,
    ) -> StoreResult<Option<PoolEntry>> {
        let query =
            format!("SELECT {COLUMNS} FROM pool_entries WHERE campaign_id = ? AND asset_id = ?");
        Ok(sqlx::query_as::<_, PoolEntry>(&query)
            .bind(campaign_id)
            .bind(asset_id)
            .fetch_optional(pool)
            .await?)
    }

    /// List a campaign's pool ordered by asset name.
    pub async fn entries_for_campaign(
        pool: &SqlitePool,
        campaign_id: DbId,
    ) -> StoreResult<Vec<PoolEntry>> {
        let query = format!(
            "SELECT pe.id, pe.campaign_id, pe.asset_id, pe.library_id, \
                    pe.initial_quantity, pe.current_quantity \
             FROM pool_entries pe \
             JOIN assets a ON a.id = pe.asset_id \
             WHERE pe.campaign_id = ? \
             ORDER BY a.name, pe.id"
        );
        Ok(sqlx::query_as::<_, PoolEntry>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await?)
    }
}

/// Apply a quantity change to a pool entry: `current = max(0, current + delta)`.
///
/// Invoked by the timeline paths when a quantity change is created; must run
/// inside the caller's transaction. When the (campaign, asset) pair is not
/// pooled the change has no pool effect and this is a silent no-op.
pub(crate) async fn apply_change(
    conn: &mut SqliteConnection,
    campaign_id: DbId,
    asset_id: DbId,
    delta: i64,
) -> Result<(), sqlx::Error> {
    adjust(conn, campaign_id, asset_id, delta, accounting::apply_delta).await
}

/// Reverse a previously applied change: `current = max(0, current - delta)`.
///
/// Invoked before a quantity change is deleted or replaced during an edit;
/// must run inside the caller's transaction and be paired 1:1 with the
/// apply. Same no-op rule for unpooled assets.
pub(crate) async fn reverse_change(
    conn: &mut SqliteConnection,
    campaign_id: DbId,
    asset_id: DbId,
    delta: i64,
) -> Result<(), sqlx::Error> {
    adjust(conn, campaign_id, asset_id, delta, accounting::reverse_delta).await
}

async fn adjust(
    conn: &mut SqliteConnection,
    campaign_id: DbId,
    asset_id: DbId,
    delta: i64,
    transition: fn(i64, i64) -> i64,
) -> Result<(), sqlx::Error> {
    let row: Option<(DbId, i64)> = sqlx::query_as(
        "SELECT id, current_quantity FROM pool_entries WHERE campaign_id = ? AND asset_id = ?",
    )
    .bind(campaign_id)
    .bind(asset_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((entry_id, current)) = row else {
        // Asset usage not tracked in this campaign's pool.
        return Ok(());
    };

    sqlx::query("UPDATE pool_entries SET current_quantity = ? WHERE id = ?")
        .bind(transition(current, delta))
        .bind(entry_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Fetch a pool entry inside the caller's transaction, or `NotFound`.
async fn fetch_entry(conn: &mut SqliteConnection, entry_id: DbId) -> StoreResult<PoolEntry> {
    let query = format!("SELECT {COLUMNS} FROM pool_entries WHERE id = ?");
    sqlx::query_as::<_, PoolEntry>(&query)
        .bind(entry_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("pool entry", entry_id))
}
