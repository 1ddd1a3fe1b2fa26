//! Catalog store tests: library and asset CRUD, in-use delete conflicts,
//! and cross-library copies.

mod common;

use assert_matches::assert_matches;
use muster_core::CoreError;
use muster_db::models::asset::UpdateAsset;
use muster_db::models::library::UpdateLibrary;
use muster_db::repositories::{CampaignRepo, LibraryRepo, PoolRepo};
use muster_db::StoreError;

use common::{memory_pool, new_asset, new_campaign, new_library};

#[tokio::test]
async fn library_names_are_globally_unique() {
    let pool = memory_pool().await;

    LibraryRepo::create_library(&pool, &new_library("WWII Pacific"))
        .await
        .unwrap();
    let err = LibraryRepo::create_library(&pool, &new_library("WWII Pacific"))
        .await
        .unwrap_err();

    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn empty_library_name_is_rejected() {
    let pool = memory_pool().await;

    let err = LibraryRepo::create_library(&pool, &new_library(""))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn asset_names_are_unique_per_library_only() {
    let pool = memory_pool().await;

    let first = LibraryRepo::create_library(&pool, &new_library("Modern"))
        .await
        .unwrap();
    let second = LibraryRepo::create_library(&pool, &new_library("Sci-Fi"))
        .await
        .unwrap();

    LibraryRepo::create_asset(&pool, &new_asset(first.id, "Transport", 2))
        .await
        .unwrap();

    // Same name in another library is fine.
    LibraryRepo::create_asset(&pool, &new_asset(second.id, "Transport", 2))
        .await
        .unwrap();

    // Duplicate within the same library is not.
    let err = LibraryRepo::create_asset(&pool, &new_asset(first.id, "Transport", 2))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn negative_default_quantity_is_rejected() {
    let pool = memory_pool().await;
    let library = LibraryRepo::create_library(&pool, &new_library("Modern"))
        .await
        .unwrap();

    let err = LibraryRepo::create_asset(&pool, &new_asset(library.id, "Jeep", -1))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn creating_an_asset_in_a_missing_library_is_not_found() {
    let pool = memory_pool().await;

    let err = LibraryRepo::create_asset(&pool, &new_asset(42, "Jeep", 1))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "library", .. }));
}

#[tokio::test]
async fn renaming_an_asset_onto_an_existing_name_conflicts() {
    let pool = memory_pool().await;
    let library = LibraryRepo::create_library(&pool, &new_library("Modern"))
        .await
        .unwrap();
    LibraryRepo::create_asset(&pool, &new_asset(library.id, "Jeep", 1))
        .await
        .unwrap();
    let truck = LibraryRepo::create_asset(&pool, &new_asset(library.id, "Truck", 1))
        .await
        .unwrap();

    let rename = UpdateAsset {
        name: Some("Jeep".to_string()),
        ..Default::default()
    };
    let err = LibraryRepo::update_asset(&pool, truck.id, &rename)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn deleting_a_pooled_asset_is_refused_until_removed_from_the_pool() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 5).await;

    let err = LibraryRepo::delete_asset(&pool, scenario.asset.id)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));

    PoolRepo::remove_entry(&pool, scenario.entry.id).await.unwrap();

    LibraryRepo::delete_asset(&pool, scenario.asset.id)
        .await
        .unwrap();
    assert!(LibraryRepo::find_asset(&pool, scenario.asset.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn deleting_an_imported_library_is_refused() {
    let pool = memory_pool().await;

    let library = LibraryRepo::create_library(&pool, &new_library("Modern"))
        .await
        .unwrap();
    LibraryRepo::create_asset(&pool, &new_asset(library.id, "Jeep", 1))
        .await
        .unwrap();
    let campaign = CampaignRepo::create(&pool, &new_campaign("Operation Anvil"))
        .await
        .unwrap();
    CampaignRepo::import_library(&pool, campaign.id, library.id)
        .await
        .unwrap();

    let err = LibraryRepo::delete_library(&pool, library.id)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn deleting_a_library_with_directly_pooled_assets_is_refused() {
    let pool = memory_pool().await;
    let scenario = common::scenario(&pool, 3).await;

    // No import exists; the asset entered the pool directly.
    let err = LibraryRepo::delete_library(&pool, scenario.library.id)
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

#[tokio::test]
async fn deleting_an_unreferenced_library_cascades_to_its_assets() {
    let pool = memory_pool().await;

    let library = LibraryRepo::create_library(&pool, &new_library("Modern"))
        .await
        .unwrap();
    let asset = LibraryRepo::create_asset(&pool, &new_asset(library.id, "Jeep", 1))
        .await
        .unwrap();

    LibraryRepo::delete_library(&pool, library.id).await.unwrap();

    assert!(LibraryRepo::find_library(&pool, library.id)
        .await
        .unwrap()
        .is_none());
    assert!(LibraryRepo::find_asset(&pool, asset.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn updating_a_library_keeps_unset_fields() {
    let pool = memory_pool().await;

    let mut input = new_library("Modern");
    input.category = Some("Contemporary".to_string());
    let library = LibraryRepo::create_library(&pool, &input).await.unwrap();

    let update = UpdateLibrary {
        name: Some("Modern Warfare".to_string()),
        ..Default::default()
    };
    let updated = LibraryRepo::update_library(&pool, library.id, &update)
        .await
        .unwrap();

    assert_eq!(updated.name, "Modern Warfare");
    assert_eq!(updated.category.as_deref(), Some("Contemporary"));
}

#[tokio::test]
async fn copy_skips_name_collisions_and_missing_sources() {
    let pool = memory_pool().await;

    let source = LibraryRepo::create_library(&pool, &new_library("Source"))
        .await
        .unwrap();
    let target = LibraryRepo::create_library(&pool, &new_library("Target"))
        .await
        .unwrap();

    let jeep = LibraryRepo::create_asset(&pool, &new_asset(source.id, "Jeep", 2))
        .await
        .unwrap();
    let truck = LibraryRepo::create_asset(&pool, &new_asset(source.id, "Truck", 4))
        .await
        .unwrap();
    // Already present in the target under the same name.
    LibraryRepo::create_asset(&pool, &new_asset(target.id, "Truck", 9))
        .await
        .unwrap();

    let outcome =
        LibraryRepo::copy_assets(&pool, &[jeep.id, truck.id, 999], target.id)
            .await
            .unwrap();

    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.skipped, 2);

    let names: Vec<String> = LibraryRepo::list_assets_in_library(&pool, target.id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, ["Jeep", "Truck"]);
}

#[tokio::test]
async fn copy_into_a_missing_library_is_not_found() {
    let pool = memory_pool().await;

    let err = LibraryRepo::copy_assets(&pool, &[1], 77).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "library", .. }));
}
