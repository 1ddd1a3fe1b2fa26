//! Read-side reporting and export.
//!
//! Everything here is a pure function of current store state: tabular
//! campaign reports with CSV rendering, the full nested archival snapshot,
//! the closure snapshot written when a campaign closes, and the public
//! dashboard/timeline views. A campaign with no missions or pool entries
//! produces empty collections, not errors. No locks are taken; reads may
//! observe a snapshot concurrent with in-flight writes.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use muster_core::accounting;
use muster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::models::campaign::Campaign;
use crate::repositories::{CampaignRepo, EventRepo, LogRepo, MissionRepo};

// ---------------------------------------------------------------------------
// Report shapes
// ---------------------------------------------------------------------------

/// Campaign header common to all exports.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignHeader {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
}

/// One asset's movement within a campaign.
#[derive(Debug, Clone, Serialize)]
pub struct AssetHistoryRow {
    pub asset_name: String,
    pub asset_type: String,
    pub initial_quantity: i64,
    pub current_quantity: i64,
    pub net_change: i64,
}

/// Tabular campaign report.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub campaign: CampaignHeader,
    pub missions_count: i64,
    pub asset_history: Vec<AssetHistoryRow>,
}

/// A quantity-change record inside the archival snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    pub asset_name: String,
    pub quantity_change: i64,
    pub notes: Option<String>,
}

/// An event inside the archival snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub notes: Option<String>,
    pub asset_changes: Vec<ChangeRecord>,
}

/// A mission inside the archival snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct MissionRecord {
    pub name: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub events: Vec<EventRecord>,
}

/// An audit log record inside the archival snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub action: String,
    pub details: Option<String>,
    pub created_at: Timestamp,
}

/// Full nested snapshot for archival export.
#[derive(Debug, Clone, Serialize)]
pub struct FinalReport {
    #[serde(flatten)]
    pub report: CampaignReport,
    pub detailed_missions: Vec<MissionRecord>,
    pub logs: Vec<LogRecord>,
}

/// Subset snapshot persisted when a campaign is closed.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureSnapshot {
    pub campaign: CampaignHeader,
    pub closed_at: Timestamp,
}

/// One visible pool row on the public dashboard.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PoolAssetView {
    pub name: String,
    pub asset_type: String,
    pub category: Option<String>,
    pub current_quantity: i64,
}

/// One change line on the public timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineChange {
    pub asset_name: String,
    pub asset_type: String,
    pub quantity_change: i64,
}

/// One entry on the public timeline, titled "Mission: Event".
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub title: String,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub event_type: String,
    pub description: String,
    pub asset_changes: Vec<TimelineChange>,
}

/// Change statistics for one mission's operational view.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MissionChangeStats {
    pub total_changes: i64,
    pub gains: i64,
    pub losses: i64,
}

// ---------------------------------------------------------------------------
// Tabular report + CSV
// ---------------------------------------------------------------------------

fn campaign_header(campaign: &Campaign) -> CampaignHeader {
    CampaignHeader {
        name: campaign.name.clone(),
        description: campaign.description.clone(),
        start_date: campaign.start_date,
        end_date: campaign.end_date,
        status: campaign.status().to_string(),
    }
}

/// Build the tabular report for a campaign.
pub async fn campaign_report(pool: &SqlitePool, campaign_id: DbId) -> StoreResult<CampaignReport> {
    let campaign = CampaignRepo::find_by_id(pool, campaign_id)
        .await?
        .ok_or_else(|| StoreError::not_found("campaign", campaign_id))?;

    let missions_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM missions WHERE campaign_id = ?")
            .bind(campaign_id)
            .fetch_one(pool)
            .await?;

    let rows: Vec<(String, String, i64, i64)> = sqlx::query_as(
        "SELECT a.name, a.asset_type, pe.initial_quantity, pe.current_quantity \
         FROM pool_entries pe \
         JOIN assets a ON a.id = pe.asset_id \
         WHERE pe.campaign_id = ? \
         ORDER BY a.name, pe.id",
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;

    let asset_history = rows
        .into_iter()
        .map(|(asset_name, asset_type, initial, current)| AssetHistoryRow {
            asset_name,
            asset_type,
            initial_quantity: initial,
            current_quantity: current,
            net_change: accounting::net_change(initial, current),
        })
        .collect();

    Ok(CampaignReport {
        campaign: campaign_header(&campaign),
        missions_count,
        asset_history,
    })
}

/// Render a campaign report as CSV.
pub fn render_csv(report: &CampaignReport) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "Asset Name",
        "Asset Type",
        "Initial Quantity",
        "Current Quantity",
        "Net Change",
    ])?;

    for row in &report.asset_history {
        writer.write_record([
            row.asset_name.clone(),
            row.asset_type.clone(),
            row.initial_quantity.to_string(),
            row.current_quantity.to_string(),
            row.net_change.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Archival snapshot
// ---------------------------------------------------------------------------

/// Build the full nested snapshot: the tabular report plus the mission and
/// event history and the campaign's audit log.
pub async fn final_report(pool: &SqlitePool, campaign_id: DbId) -> StoreResult<FinalReport> {
    let report = campaign_report(pool, campaign_id).await?;

    let mut detailed_missions = Vec::new();
    for mission in MissionRepo::list_for_campaign(pool, campaign_id).await? {
        let mut events = Vec::new();
        for event in EventRepo::list_for_mission(pool, mission.id).await? {
            let changes: Vec<(String, i64, Option<String>)> = sqlx::query_as(
                "SELECT a.name, qc.quantity_change, qc.notes \
                 FROM quantity_changes qc \
                 JOIN assets a ON a.id = qc.asset_id \
                 WHERE qc.event_id = ? \
                 ORDER BY qc.id",
            )
            .bind(event.id)
            .fetch_all(pool)
            .await?;

            events.push(EventRecord {
                event_type: event.event_type,
                description: event.description,
                date: event.event_date,
                notes: event.notes,
                asset_changes: changes
                    .into_iter()
                    .map(|(asset_name, quantity_change, notes)| ChangeRecord {
                        asset_name,
                        quantity_change,
                        notes,
                    })
                    .collect(),
            });
        }

        detailed_missions.push(MissionRecord {
            name: mission.name,
            date: mission.mission_date,
            description: mission.description,
            events,
        });
    }

    let logs = LogRepo::list_for_campaign(pool, campaign_id)
        .await?
        .into_iter()
        .map(|entry| LogRecord {
            action: entry.action,
            details: entry.details,
            created_at: entry.created_at,
        })
        .collect();

    Ok(FinalReport {
        report,
        detailed_missions,
        logs,
    })
}

// ---------------------------------------------------------------------------
// Closure snapshot
// ---------------------------------------------------------------------------

/// Build the subset snapshot persisted at campaign close.
pub fn closure_snapshot(campaign: &Campaign, closed_at: Timestamp) -> ClosureSnapshot {
    let mut header = campaign_header(campaign);
    header.status = "closed".to_string();
    ClosureSnapshot {
        campaign: header,
        closed_at,
    }
}

/// Filename for a closure snapshot, keyed by campaign id and timestamp.
pub fn snapshot_filename(campaign_id: DbId, closed_at: Timestamp) -> String {
    format!(
        "campaign_{campaign_id}_{}.json",
        closed_at.format("%Y%m%d_%H%M%S")
    )
}

/// Write the closure snapshot under `dir`, returning the filename.
///
/// The caller treats a failure here as non-fatal.
pub fn write_closure_snapshot(dir: &Path, campaign: &Campaign) -> io::Result<String> {
    let closed_at = Utc::now();
    let snapshot = closure_snapshot(campaign, closed_at);

    std::fs::create_dir_all(dir)?;
    let filename = snapshot_filename(campaign.id, closed_at);
    let json = serde_json::to_vec_pretty(&snapshot)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    std::fs::write(dir.join(&filename), json)?;

    info!(campaign_id = campaign.id, filename = %filename, "closure snapshot written");
    Ok(filename)
}

// ---------------------------------------------------------------------------
// Public views
// ---------------------------------------------------------------------------

/// Visible pool rows for the active campaign's public dashboard.
///
/// Empty when no campaign is active. Assets flagged out of the public view
/// are omitted.
pub async fn active_pool(pool: &SqlitePool) -> StoreResult<Vec<PoolAssetView>> {
    let Some(campaign) = CampaignRepo::get_active(pool).await? else {
        return Ok(Vec::new());
    };

    Ok(sqlx::query_as::<_, PoolAssetView>(
        "SELECT a.name, a.asset_type, a.category, pe.current_quantity \
         FROM pool_entries pe \
         JOIN assets a ON a.id = pe.asset_id \
         WHERE pe.campaign_id = ? AND a.show_in_public = 1 \
         ORDER BY a.name, pe.id",
    )
    .bind(campaign.id)
    .fetch_all(pool)
    .await?)
}

/// The active campaign's event feed, newest first.
///
/// Entries are titled "Mission: Event"; the description falls back to the
/// event notes when empty.
pub async fn public_timeline(pool: &SqlitePool) -> StoreResult<Vec<TimelineEntry>> {
    let Some(campaign) = CampaignRepo::get_active(pool).await? else {
        return Ok(Vec::new());
    };

    let change_rows: Vec<(DbId, String, String, i64)> = sqlx::query_as(
        "SELECT qc.event_id, a.name, a.asset_type, qc.quantity_change \
         FROM quantity_changes qc \
         JOIN assets a ON a.id = qc.asset_id \
         JOIN events e ON e.id = qc.event_id \
         JOIN missions m ON m.id = e.mission_id \
         WHERE m.campaign_id = ? \
         ORDER BY qc.id",
    )
    .bind(campaign.id)
    .fetch_all(pool)
    .await?;

    let mut changes_by_event: HashMap<DbId, Vec<TimelineChange>> = HashMap::new();
    for (event_id, asset_name, asset_type, quantity_change) in change_rows {
        changes_by_event
            .entry(event_id)
            .or_default()
            .push(TimelineChange {
                asset_name,
                asset_type,
                quantity_change,
            });
    }

    let event_rows: Vec<(DbId, String, String, String, Option<String>, Option<String>, NaiveDateTime)> =
        sqlx::query_as(
            "SELECT e.id, m.name, e.title, e.event_type, e.description, e.notes, e.event_date \
             FROM events e \
             JOIN missions m ON m.id = e.mission_id \
             WHERE m.campaign_id = ? \
             ORDER BY e.event_date DESC, e.id DESC",
        )
        .bind(campaign.id)
        .fetch_all(pool)
        .await?;

    Ok(event_rows
        .into_iter()
        .map(
            |(event_id, mission_name, title, event_type, description, notes, event_date)| {
                TimelineEntry {
                    title: format!("{mission_name}: {title}"),
                    date: event_date,
                    event_type,
                    description: description
                        .filter(|text| !text.is_empty())
                        .or(notes)
                        .unwrap_or_default(),
                    asset_changes: changes_by_event.remove(&event_id).unwrap_or_default(),
                }
            },
        )
        .collect())
}

/// Change statistics for one mission's operational view.
pub async fn mission_change_stats(
    pool: &SqlitePool,
    mission_id: DbId,
) -> StoreResult<MissionChangeStats> {
    MissionRepo::find_by_id(pool, mission_id)
        .await?
        .ok_or_else(|| StoreError::not_found("mission", mission_id))?;

    let (total_changes, gains, losses): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
                COALESCE(SUM(CASE WHEN qc.quantity_change > 0 THEN qc.quantity_change ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN qc.quantity_change < 0 THEN -qc.quantity_change ELSE 0 END), 0) \
         FROM quantity_changes qc \
         JOIN events e ON e.id = qc.event_id \
         WHERE e.mission_id = ?",
    )
    .bind(mission_id)
    .fetch_one(pool)
    .await?;

    Ok(MissionChangeStats {
        total_changes,
        gains,
        losses,
    })
}
