//! Repository for the `missions` table.
//!
//! Missions order by the manager-assigned `order_index` (ties broken by
//! creation order), never by date. Deleting a mission cascades to its
//! events and their quantity changes at the storage layer -- deliberately
//! WITHOUT reconciling pool quantities; only the event- and change-level
//! delete paths reverse pool effects.

use chrono::Utc;
use muster_core::timeline;
use muster_core::types::DbId;
use sqlx::sqlite::{SqliteConnection, SqlitePool};

use crate::error::{validate_input, StoreError, StoreResult};
use crate::models::mission::{CreateMission, Mission, UpdateMission};
use crate::repositories::campaign_repo::fetch_open_campaign;

/// Column list for `missions` queries.
pub(crate) const MISSION_COLUMNS: &str = "\
    id, campaign_id, name, description, mission_date, location, \
    status, order_index, map_edit_url, map_view_url, created_at";

/// Provides CRUD operations for missions.
pub struct MissionRepo;

impl MissionRepo {
    /// Create a mission.
    pub async fn create(pool: &SqlitePool, input: &CreateMission) -> StoreResult<Mission> {
        validate_input(input)?;
        timeline::validate_status(&input.status).map_err(StoreError::validation)?;

        let mut tx = pool.begin().await?;
        fetch_open_campaign(&mut tx, input.campaign_id).await?;

        let query = format!(
            "INSERT INTO missions \
                (campaign_id, name, description, mission_date, location, \
                 status, order_index, map_edit_url, map_view_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {MISSION_COLUMNS}"
        );
        let mission = sqlx::query_as::<_, Mission>(&query)
            .bind(input.campaign_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.mission_date)
            .bind(&input.location)
            .bind(&input.status)
            .bind(input.order_index)
            .bind(&input.map_edit_url)
            .bind(&input.map_view_url)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(mission)
    }

    /// Update a mission's attributes.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateMission,
    ) -> StoreResult<Mission> {
        validate_input(input)?;
        if let Some(status) = &input.status {
            timeline::validate_status(status).map_err(StoreError::validation)?;
        }

        let mut tx = pool.begin().await?;

        let mission = fetch_mission(&mut tx, id).await?;
        fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        let query = format!(
            "UPDATE missions SET \
                name = COALESCE(?, name), \
                description = COALESCE(?, description), \
                mission_date = COALESCE(?, mission_date), \
                location = COALESCE(?, location), \
                status = COALESCE(?, status), \
                order_index = COALESCE(?, order_index), \
                map_edit_url = COALESCE(?, map_edit_url), \
                map_view_url = COALESCE(?, map_view_url) \
             WHERE id = ? \
             RETURNING {MISSION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Mission>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.mission_date)
            .bind(&input.location)
            .bind(&input.status)
            .bind(input.order_index)
            .bind(&input.map_edit_url)
            .bind(&input.map_view_url)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a mission and, transitively, its events and their quantity
    /// changes. Pool quantities are NOT reverted.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        let mission = fetch_mission(&mut tx, id).await?;
        fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        sqlx::query("DELETE FROM missions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Find a mission by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> StoreResult<Option<Mission>> {
        let query = format!("SELECT {MISSION_COLUMNS} FROM missions WHERE id = ?");
        Ok(sqlx::query_as::<_, Mission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?)
    }

    /// List a campaign's missions in display order.
    pub async fn list_for_campaign(
        pool: &SqlitePool,
        campaign_id: DbId,
    ) -> StoreResult<Vec<Mission>> {
        let query = format!(
            "SELECT {MISSION_COLUMNS} FROM missions \
             WHERE campaign_id = ? \
             ORDER BY order_index, id"
        );
        Ok(sqlx::query_as::<_, Mission>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await?)
    }

    /// Highest `order_index` in use for a campaign, 0 when it has no
    /// missions. Used to place newly created missions at the end.
    pub async fn max_order_index(pool: &SqlitePool, campaign_id: DbId) -> StoreResult<i64> {
        let max: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(order_index), 0) FROM missions WHERE campaign_id = ?",
        )
        .bind(campaign_id)
        .fetch_one(pool)
        .await?;
        Ok(max)
    }
}

/// Fetch a mission inside the caller's transaction, or `NotFound`.
pub(crate) async fn fetch_mission(conn: &mut SqliteConnection, id: DbId) -> StoreResult<Mission> {
    let query = format!("SELECT {MISSION_COLUMNS} FROM missions WHERE id = ?");
    sqlx::query_as::<_, Mission>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("mission", id))
}
