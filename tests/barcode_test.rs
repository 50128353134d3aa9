mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use wb_tracks_api::entities::{component, temporary_barcode};
use wb_tracks_api::errors::ServiceError;

use common::{seed_component, test_state};

#[tokio::test]
async fn lookup_resolves_component_number() {
    let (state, _rx) = test_state().await;
    let created = seed_component(&state, "C-2001").await;

    let found = state.services.barcode.lookup("C-2001").await.unwrap();
    assert_eq!(found.id, created.id);
}

#[tokio::test]
async fn lookup_resolves_assigned_alias() {
    let (state, _rx) = test_state().await;
    let created = seed_component(&state, "C-2002").await;

    let mut active: component::ActiveModel = created.clone().into();
    active.barcode = Set(Some("EAN-0042".to_string()));
    active.update(state.db.as_ref()).await.unwrap();

    let found = state.services.barcode.lookup("EAN-0042").await.unwrap();
    assert_eq!(found.id, created.id);
}

#[tokio::test]
async fn lookup_of_unknown_code_is_not_found() {
    let (state, _rx) = test_state().await;
    seed_component(&state, "C-2003").await;

    let err = state
        .services
        .barcode
        .lookup("does-not-exist")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn temporary_barcode_round_trip_counts_usage() {
    let (state, _rx) = test_state().await;
    let created = seed_component(&state, "C-2004").await;

    let temp = state
        .services
        .barcode
        .create_temporary(created.id, Some(4), None)
        .await
        .unwrap();
    assert!(temp.barcode.starts_with("WB-TMP-"));
    assert_eq!(temp.usage_count, 0);

    let found = state.services.barcode.lookup(&temp.barcode).await.unwrap();
    assert_eq!(found.id, created.id);
    state.services.barcode.lookup(&temp.barcode).await.unwrap();

    let row = temporary_barcode::Entity::find_by_id(temp.id)
        .one(state.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.usage_count, 2);
}

#[tokio::test]
async fn expired_temporary_barcode_is_not_found() {
    let (state, _rx) = test_state().await;
    let created = seed_component(&state, "C-2005").await;

    // The row exists but expired yesterday.
    temporary_barcode::ActiveModel {
        id: Set(Uuid::new_v4()),
        barcode: Set("WB-TMP-EXPIRED1".to_string()),
        component_id: Set(created.id),
        expires_at: Set(Utc::now() - Duration::hours(24)),
        usage_count: Set(0),
        active: Set(true),
        created_by: Set(None),
        created_at: Set(Utc::now() - Duration::hours(48)),
    }
    .insert(state.db.as_ref())
    .await
    .unwrap();

    let err = state
        .services
        .barcode
        .lookup("WB-TMP-EXPIRED1")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // Expiry does not delete the row.
    let still_there = temporary_barcode::Entity::find()
        .filter(temporary_barcode::Column::Barcode.eq("WB-TMP-EXPIRED1"))
        .one(state.db.as_ref())
        .await
        .unwrap();
    assert!(still_there.is_some());
}

#[tokio::test]
async fn temporary_barcode_requires_active_component() {
    let (state, _rx) = test_state().await;

    let err = state
        .services
        .barcode
        .create_temporary(Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn inactive_component_does_not_resolve() {
    let (state, _rx) = test_state().await;
    let created = seed_component(&state, "C-2006").await;

    let mut active: component::ActiveModel = created.into();
    active.active = Set(false);
    active.update(state.db.as_ref()).await.unwrap();

    let err = state.services.barcode.lookup("C-2006").await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
