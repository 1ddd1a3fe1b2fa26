//! Asset-pool accounting tests.
//!
//! Covers the state machine over `current_quantity`: seeding, rebasing,
//! apply/reverse pairing through the event paths, the zero floor, and the
//! clamp-then-naive-reverse divergence that reversal deliberately keeps.

mod common;

use assert_matches::assert_matches;
use muster_core::CoreError;
use muster_db::repositories::{EventRepo, LibraryRepo, PoolRepo};
use muster_db::StoreError;

use common::{line, memory_pool, new_asset, new_event};

#[tokio::test]
async fn adding_an_entry_seeds_initial_and_current() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 5).await;

    assert_eq!(scenario.entry.initial_quantity, 5);
    assert_eq!(scenario.entry.current_quantity, 5);
    assert_eq!(scenario.entry.library_id, scenario.library.id);
}

#[tokio::test]
async fn an_asset_pools_at_most_once_per_campaign() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 5).await;

    let err = PoolRepo::add_entry(&pool, scenario.campaign.id, scenario.asset.id, 3)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn negative_seed_quantity_is_rejected() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 5).await;

    let other = LibraryRepo::create_asset(
        &pool,
        &new_asset(scenario.library.id, "Radio", 1),
    )
    .await
    .unwrap();

    let err = PoolRepo::add_entry(&pool, scenario.campaign.id, other.id, -2)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn pooling_a_missing_asset_is_not_found() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 5).await;

    let err = PoolRepo::add_entry(&pool, scenario.campaign.id, 404, 1)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "asset", .. }));
}

#[tokio::test]
async fn quantities_track_the_sum_of_applied_deltas() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Supply run"),
        &[line(scenario.asset.id, 4)],
    )
    .await
    .unwrap();
    EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Ambush"),
        &[line(scenario.asset.id, -7)],
    )
    .await
    .unwrap();

    let entry = PoolRepo::find_entry(&pool, scenario.entry.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.current_quantity, 10 + 4 - 7);
    assert_eq!(entry.initial_quantity, 10);
}

#[tokio::test]
async fn a_loss_below_zero_clamps_to_exactly_zero() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 3).await;

    EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Rout"),
        &[line(scenario.asset.id, -5)],
    )
    .await
    .unwrap();

    let entry = PoolRepo::find_entry(&pool, scenario.entry.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.current_quantity, 0);
}

#[tokio::test]
async fn deleting_an_event_restores_the_pre_event_quantity() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    let (event, _) = EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Ambush"),
        &[line(scenario.asset.id, -5)],
    )
    .await
    .unwrap();

    let entry = PoolRepo::find_entry(&pool, scenario.entry.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.current_quantity, 5);

    EventRepo::delete_event(&pool, event.id).await.unwrap();

    let entry = PoolRepo::find_entry(&pool, scenario.entry.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.current_quantity, 10);
}

#[tokio::test]
async fn reversing_a_clamped_loss_overshoots_the_true_net() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    let (event, _) = EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Catastrophe"),
        &[line(scenario.asset.id, -15)],
    )
    .await
    .unwrap();

    let entry = PoolRepo::find_entry(&pool, scenario.entry.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.current_quantity, 0, "-15 on 10 clamps to 0");

    EventRepo::delete_event(&pool, event.id).await.unwrap();

    // Reversal subtracts the original -15 from the clamped 0: the entry
    // lands on 15, not the pre-event 10. The clamp is a lossy one-way
    // floor and reversal does not compensate for it.
    let entry = PoolRepo::find_entry(&pool, scenario.entry.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.current_quantity, 15);
}

#[tokio::test]
async fn changes_on_unpooled_assets_are_recorded_without_pool_effect() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    let unpooled = LibraryRepo::create_asset(
        &pool,
        &new_asset(scenario.library.id, "Borrowed Truck", 1),
    )
    .await
    .unwrap();

    let (event, changes) = EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("External support"),
        &[line(unpooled.id, -3)],
    )
    .await
    .unwrap();

    // The change is persisted on the timeline...
    assert_eq!(changes.len(), 1);
    assert_eq!(
        EventRepo::changes_for_event(&pool, event.id).await.unwrap().len(),
        1
    );
    // ...but there is still no pool entry for the asset.
    assert!(PoolRepo::entry_for_asset(&pool, scenario.campaign.id, unpooled.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn rebasing_the_initial_quantity_preserves_applied_deltas() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Ambush"),
        &[line(scenario.asset.id, -3)],
    )
    .await
    .unwrap();

    let entry = PoolRepo::set_initial_quantity(&pool, scenario.entry.id, 20)
        .await
        .unwrap();
    assert_eq!(entry.initial_quantity, 20);
    assert_eq!(entry.current_quantity, 17, "the -3 net effect survives");
}

#[tokio::test]
async fn rebasing_far_below_the_losses_clamps_current_at_zero() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Ambush"),
        &[line(scenario.asset.id, -8)],
    )
    .await
    .unwrap();

    let entry = PoolRepo::set_initial_quantity(&pool, scenario.entry.id, 1)
        .await
        .unwrap();
    assert_eq!(entry.initial_quantity, 1);
    assert_eq!(entry.current_quantity, 0);
}

#[tokio::test]
async fn negative_rebase_is_rejected() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    let err = PoolRepo::set_initial_quantity(&pool, scenario.entry.id, -4)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn removing_an_entry_leaves_its_change_history_behind() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 10).await;

    let (event, _) = EventRepo::create_event(
        &pool,
        scenario.mission.id,
        &new_event("Ambush"),
        &[line(scenario.asset.id, -2)],
    )
    .await
    .unwrap();

    PoolRepo::remove_entry(&pool, scenario.entry.id).await.unwrap();

    assert!(PoolRepo::find_entry(&pool, scenario.entry.id)
        .await
        .unwrap()
        .is_none());
    // The quantity change survives independently of the pool entry.
    assert_eq!(
        EventRepo::changes_for_event(&pool, event.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn removing_a_missing_entry_is_not_found() {
    let pool = memory_pool().await;
    common::scenario(&pool, 10).await;

    let err = PoolRepo::remove_entry(&pool, 909).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "pool entry", .. }));
}
