//! Repository for the `events` and `quantity_changes` tables.
//!
//! Events carry the quantity-change line items that mutate pool entries.
//! Creating a change applies its delta to the pool; deleting or editing one
//! reverses the prior delta first. The triad of change-row mutation, pool
//! adjustment, and commit is all-or-nothing: everything here runs inside a
//! single transaction per operation.

use chrono::Utc;
use muster_core::timeline;
use muster_core::types::DbId;
use sqlx::sqlite::{SqliteConnection, SqlitePool};

use crate::error::{validate_input, StoreError, StoreResult};
use crate::models::event::{ChangeLine, CreateEvent, Event, QuantityChange, UpdateEvent};
use crate::repositories::campaign_repo::fetch_open_campaign;
use crate::repositories::mission_repo::fetch_mission;
use crate::repositories::pool_repo::{apply_change, reverse_change};

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "\
    id, mission_id, event_type, title, description, event_date, \
    location, notes, created_at";

/// Column list for `quantity_changes` queries.
const CHANGE_COLUMNS: &str = "id, event_id, asset_id, quantity_change, notes";

/// Provides event and quantity-change operations.
pub struct EventRepo;

impl EventRepo {
    /// Create an event together with its quantity-change lines.
    ///
    /// Lines with no asset selected or a zero delta are skipped entirely.
    /// Each persisted line applies its delta to the campaign pool in the
    /// same transaction. Returns the event and the changes actually
    /// created.
    pub async fn create_event(
        pool: &SqlitePool,
        mission_id: DbId,
        input: &CreateEvent,
        lines: &[ChangeLine],
    ) -> StoreResult<(Event, Vec<QuantityChange>)> {
        validate_input(input)?;
        timeline::validate_event_type(&input.event_type).map_err(StoreError::validation)?;

        let mut tx = pool.begin().await?;

        let mission = fetch_mission(&mut tx, mission_id).await?;
        let campaign = fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        let query = format!(
            "INSERT INTO events \
                (mission_id, event_type, title, description, event_date, \
                 location, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(mission_id)
            .bind(&input.event_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.event_date)
            .bind(&input.location)
            .bind(&input.notes)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        let mut changes = Vec::new();
        for line in lines {
            let Some(asset_id) = line.asset_id else {
                continue;
            };
            if line.quantity_change == 0 {
                continue;
            }

            let change = insert_change(
                &mut tx,
                event.id,
                asset_id,
                line.quantity_change,
                line.notes.as_deref(),
            )
            .await?;
            apply_change(&mut tx, campaign.id, asset_id, line.quantity_change).await?;
            changes.push(change);
        }

        tx.commit().await?;
        Ok((event, changes))
    }

    /// Update an event's attributes. Quantity changes are managed through
    /// their own operations.
    pub async fn update_event(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateEvent,
    ) -> StoreResult<Event> {
        validate_input(input)?;
        if let Some(event_type) = &input.event_type {
            timeline::validate_event_type(event_type).map_err(StoreError::validation)?;
        }

        let mut tx = pool.begin().await?;

        let event = fetch_event(&mut tx, id).await?;
        let mission = fetch_mission(&mut tx, event.mission_id).await?;
        fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        let query = format!(
            "UPDATE events SET \
                event_type = COALESCE(?, event_type), \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                event_date = COALESCE(?, event_date), \
                location = COALESCE(?, location), \
                notes = COALESCE(?, notes) \
             WHERE id = ? \
             RETURNING {EVENT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Event>(&query)
            .bind(&input.event_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.event_date)
            .bind(&input.location)
            .bind(&input.notes)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an event, reversing every child change against the pool
    /// before the cascade removes the rows.
    pub async fn delete_event(pool: &SqlitePool, id: DbId) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        let event = fetch_event(&mut tx, id).await?;
        let mission = fetch_mission(&mut tx, event.mission_id).await?;
        let campaign = fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        let select = format!("SELECT {CHANGE_COLUMNS} FROM quantity_changes WHERE event_id = ?");
        let changes = sqlx::query_as::<_, QuantityChange>(&select)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        for change in &changes {
            reverse_change(&mut tx, campaign.id, change.asset_id, change.quantity_change).await?;
        }

        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Add a quantity change to an existing event and apply it to the pool.
    pub async fn add_change(
        pool: &SqlitePool,
        event_id: DbId,
        asset_id: DbId,
        quantity_change: i64,
        notes: Option<&str>,
    ) -> StoreResult<QuantityChange> {
        if quantity_change == 0 {
            return Err(StoreError::validation("Quantity change must be nonzero"));
        }

        let mut tx = pool.begin().await?;

        let event = fetch_event(&mut tx, event_id).await?;
        let mission = fetch_mission(&mut tx, event.mission_id).await?;
        let campaign = fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        let asset_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM assets WHERE id = ?)")
                .bind(asset_id)
                .fetch_one(&mut *tx)
                .await?;
        if !asset_exists {
            return Err(StoreError::not_found("asset", asset_id));
        }

        let change = insert_change(&mut tx, event_id, asset_id, quantity_change, notes).await?;
        apply_change(&mut tx, campaign.id, asset_id, quantity_change).await?;

        tx.commit().await?;
        Ok(change)
    }

    /// Replace a change's delta (and optionally its note).
    ///
    /// Implemented as reverse-then-apply rather than a direct adjustment so
    /// the zero floor is re-evaluated against the correct baseline.
    pub async fn update_change(
        pool: &SqlitePool,
        change_id: DbId,
        quantity_change: i64,
        notes: Option<&str>,
    ) -> StoreResult<QuantityChange> {
        if quantity_change == 0 {
            return Err(StoreError::validation("Quantity change must be nonzero"));
        }

        let mut tx = pool.begin().await?;

        let change = fetch_change(&mut tx, change_id).await?;
        let event = fetch_event(&mut tx, change.event_id).await?;
        let mission = fetch_mission(&mut tx, event.mission_id).await?;
        let campaign = fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        reverse_change(&mut tx, campaign.id, change.asset_id, change.quantity_change).await?;

        let query = format!(
            "UPDATE quantity_changes SET quantity_change = ?, notes = COALESCE(?, notes) \
             WHERE id = ? \
             RETURNING {CHANGE_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, QuantityChange>(&query)
            .bind(quantity_change)
            .bind(notes)
            .bind(change_id)
            .fetch_one(&mut *tx)
            .await?;

        apply_change(&mut tx, campaign.id, change.asset_id, quantity_change).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a quantity change, reversing its effect on the pool first.
    pub async fn delete_change(pool: &SqlitePool, change_id: DbId) -> StoreResult<()> {
        let mut tx = pool.begin().await?;

        let change = fetch_change(&mut tx, change_id).await?;
        let event = fetch_event(&mut tx, change.event_id).await?;
        let mission = fetch_mission(&mut tx, event.mission_id).await?;
        let campaign = fetch_open_campaign(&mut tx, mission.campaign_id).await?;

        reverse_change(&mut tx, campaign.id, change.asset_id, change.quantity_change).await?;

        sqlx::query("DELETE FROM quantity_changes WHERE id = ?")
            .bind(change_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Find an event by ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> StoreResult<Option<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
        Ok(sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?)
    }

    /// List a mission's events in operational order (oldest first).
    pub async fn list_for_mission(pool: &SqlitePool, mission_id: DbId) -> StoreResult<Vec<Event>> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE mission_id = ? ORDER BY event_date, id"
        );
        Ok(sqlx::query_as::<_, Event>(&query)
            .bind(mission_id)
            .fetch_all(pool)
            .await?)
    }

    /// List an event's quantity changes in creation order.
    pub async fn changes_for_event(
        pool: &SqlitePool,
        event_id: DbId,
    ) -> StoreResult<Vec<QuantityChange>> {
        let query =
            format!("SELECT {CHANGE_COLUMNS} FROM quantity_changes WHERE event_id = ? ORDER BY id");
        Ok(sqlx::query_as::<_, QuantityChange>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await?)
    }
}

/// Insert a quantity-change row inside the caller's transaction.
async fn insert_change(
    conn: &mut SqliteConnection,
    event_id: DbId,
    asset_id: DbId,
    quantity_change: i64,
    notes: Option<&str>,
) -> Result<QuantityChange, sqlx::Error> {
    let query = format!(
        "INSERT INTO quantity_changes (event_id, asset_id, quantity_change, notes) \
         VALUES (?, ?, ?, ?) \
         RETURNING {CHANGE_COLUMNS}"
    );
    sqlx::query_as::<_, QuantityChange>(&query)
        .bind(event_id)
        .bind(asset_id)
        .bind(quantity_change)
        .bind(notes)
        .fetch_one(conn)
        .await
}

/// Fetch an event inside the caller's transaction, or `NotFound`.
async fn fetch_event(conn: &mut SqliteConnection, id: DbId) -> StoreResult<Event> {
    let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?");
    sqlx::query_as::<_, Event>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("event", id))
}

/// Fetch a quantity change inside the caller's transaction, or `NotFound`.
async fn fetch_change(conn: &mut SqliteConnection, id: DbId) -> StoreResult<QuantityChange> {
    let query = format!("SELECT {CHANGE_COLUMNS} FROM quantity_changes WHERE id = ?");
    sqlx::query_as::<_, QuantityChange>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("quantity change", id))
}
