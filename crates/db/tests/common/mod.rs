//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime};
use muster_core::types::DbId;
use muster_db::migrations;
use muster_db::models::asset::{Asset, CreateAsset};
use muster_db::models::campaign::{Campaign, CreateCampaign};
use muster_db::models::event::{ChangeLine, CreateEvent};
use muster_db::models::library::{AssetLibrary, CreateLibrary};
use muster_db::models::mission::{CreateMission, Mission};
use muster_db::models::pool::PoolEntry;
use muster_db::repositories::{CampaignRepo, LibraryRepo, MissionRepo, PoolRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

static TRACING: Once = Once::new();

/// Route log output through the test harness, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Open an in-memory database with the schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn memory_pool() -> SqlitePool {
    init_tracing();

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect to in-memory database");

    migrations::run_migrations(&pool)
        .await
        .expect("run migrations");
    pool
}

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
}

pub fn test_datetime() -> NaiveDateTime {
    test_date().and_hms_opt(12, 0, 0).expect("valid time")
}

// ---------------------------------------------------------------------------
// DTO builders
// ---------------------------------------------------------------------------

pub fn new_library(name: &str) -> CreateLibrary {
    CreateLibrary {
        name: name.to_string(),
        description: None,
        category: None,
        is_default: false,
    }
}

pub fn new_asset(library_id: DbId, name: &str, default_quantity: i64) -> CreateAsset {
    CreateAsset {
        library_id,
        name: name.to_string(),
        asset_type: "Vehicle".to_string(),
        category: None,
        description: None,
        default_quantity,
        is_unique: false,
        show_in_public: true,
    }
}

pub fn new_campaign(name: &str) -> CreateCampaign {
    CreateCampaign {
        name: name.to_string(),
        description: None,
        start_date: Some(test_date()),
        map_edit_url: None,
        map_view_url: None,
        set_active: false,
    }
}

pub fn new_mission(campaign_id: DbId, name: &str) -> CreateMission {
    CreateMission {
        campaign_id,
        name: name.to_string(),
        description: None,
        mission_date: test_date(),
        location: None,
        status: "planned".to_string(),
        order_index: 0,
        map_edit_url: None,
        map_view_url: None,
    }
}

pub fn new_event(title: &str) -> CreateEvent {
    CreateEvent {
        event_type: "combat".to_string(),
        title: title.to_string(),
        description: None,
        event_date: test_datetime(),
        location: None,
        notes: None,
    }
}

pub fn line(asset_id: DbId, quantity_change: i64) -> ChangeLine {
    ChangeLine {
        asset_id: Some(asset_id),
        quantity_change,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Seeded scenario
// ---------------------------------------------------------------------------

/// A campaign with one pooled asset and one mission, ready for events.
pub struct Scenario {
    pub library: AssetLibrary,
    pub asset: Asset,
    pub campaign: Campaign,
    pub entry: PoolEntry,
    pub mission: Mission,
}

/// Seed a library + asset + campaign + pool entry + mission.
///
/// The pool entry starts at `initial = current = initial_quantity`.
pub async fn scenario(pool: &SqlitePool, initial_quantity: i64) -> Scenario {
    let library = LibraryRepo::create_library(pool, &new_library("Motor Pool"))
        .await
        .expect("create library");
    let asset = LibraryRepo::create_asset(pool, &new_asset(library.id, "Humvee", 1))
        .await
        .expect("create asset");
    let campaign = CampaignRepo::create(pool, &new_campaign("Operation Dawn"))
        .await
        .expect("create campaign");
    let entry = PoolRepo::add_entry(pool, campaign.id, asset.id, initial_quantity)
        .await
        .expect("add pool entry");
    let mission = MissionRepo::create(pool, &new_mission(campaign.id, "First Strike"))
        .await
        .expect("create mission");

    Scenario {
        library,
        asset,
        campaign,
        entry,
        mission,
    }
}
