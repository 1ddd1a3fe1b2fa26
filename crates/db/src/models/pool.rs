//! Campaign asset-pool entity model.

use muster_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pool_entries` table.
///
/// One asset's quantity record within a campaign's pool, unique per
/// (campaign, asset). `current_quantity` is maintained by the pool
/// operations and never goes negative; `library_id` records which library
/// the asset came into the pool from.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PoolEntry {
    pub id: DbId,
    pub campaign_id: DbId,
    pub asset_id: DbId,
    pub library_id: DbId,
    pub initial_quantity: i64,
    pub current_quantity: i64,
}
