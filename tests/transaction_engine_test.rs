mod common;

use std::collections::HashMap;

use assert_matches::assert_matches;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use wb_tracks_api::entities::inventory_item;
use wb_tracks_api::entities::inventory_transaction::{self, TransactionType};
use wb_tracks_api::errors::ServiceError;
use wb_tracks_api::events::Event;
use wb_tracks_api::services::transactions::{
    AddStockCommand, ConsumeStockCommand, TransferStockCommand, MAX_MOVEMENT_QUANTITY,
};

use common::{drain_events, seed_stock_fixture, test_state};

fn add(component_id: Uuid, location_id: Uuid, quantity: i32) -> AddStockCommand {
    AddStockCommand {
        component_id,
        location_id,
        quantity,
        notes: None,
        created_by: None,
    }
}

fn transfer(
    component_id: Uuid,
    from_location_id: Uuid,
    to_location_id: Uuid,
    quantity: i32,
) -> TransferStockCommand {
    TransferStockCommand {
        component_id,
        from_location_id,
        to_location_id,
        quantity,
        notes: None,
        created_by: None,
    }
}

fn consume(component_id: Uuid, location_id: Uuid, quantity: i32) -> ConsumeStockCommand {
    ConsumeStockCommand {
        component_id,
        location_id,
        quantity,
        notes: None,
        created_by: None,
    }
}

#[tokio::test]
async fn add_creates_item_and_ledger_row() {
    let (state, mut rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;

    let movement = state
        .services
        .transactions
        .add_stock(add(fx.component.id, fx.location_a.id, 10))
        .await
        .unwrap();

    assert_eq!(movement.items.len(), 1);
    assert_eq!(movement.items[0].quantity, 10);
    assert_eq!(
        movement.transaction.transaction_type,
        TransactionType::Add.as_str()
    );
    assert_eq!(movement.transaction.to_location_id, Some(fx.location_a.id));
    assert_eq!(movement.transaction.from_location_id, None);
    assert!(movement.low_stock.is_empty());

    let events = drain_events(&mut rx);
    assert_matches!(events.as_slice(), [Event::InventoryChanged { quantity: 10, .. }]);
}

#[tokio::test]
async fn zero_and_negative_quantities_are_rejected() {
    let (state, mut rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;

    for qty in [0, -3] {
        let err = state
            .services
            .transactions
            .add_stock(add(fx.component.id, fx.location_a.id, qty))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    // Nothing was written and nothing was emitted.
    assert!(state
        .services
        .inventory
        .get_inventory(None)
        .await
        .unwrap()
        .is_empty());
    assert!(drain_events(&mut rx).is_empty());
}

#[tokio::test]
async fn oversized_and_overflowing_additions_are_rejected() {
    let (state, mut rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;

    // A single movement above the per-movement cap never reaches the store.
    let err = state
        .services
        .transactions
        .add_stock(add(
            fx.component.id,
            fx.location_a.id,
            MAX_MOVEMENT_QUANTITY + 1,
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // A counter already near the i32 ceiling refuses further increments
    // instead of overflowing inside the store.
    let now = Utc::now();
    inventory_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        component_id: Set(fx.component.id),
        location_id: Set(fx.location_a.id),
        quantity: Set(i32::MAX - 10),
        min_stock_level: Set(5),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(state.db.as_ref())
    .await
    .unwrap();

    let err = state
        .services
        .transactions
        .add_stock(add(fx.component.id, fx.location_a.id, 100))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let item = state
        .services
        .inventory
        .get_item(fx.component.id, fx.location_a.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.quantity, i32::MAX - 10);
    assert!(drain_events(&mut rx).is_empty());
}

#[tokio::test]
async fn unknown_references_are_not_found() {
    let (state, _rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;

    let err = state
        .services
        .transactions
        .add_stock(add(Uuid::new_v4(), fx.location_a.id, 5))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = state
        .services
        .transactions
        .add_stock(add(fx.component.id, Uuid::new_v4(), 5))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn transfer_moves_stock_between_locations() {
    let (state, _rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;
    let svc = &state.services.transactions;

    svc.add_stock(add(fx.component.id, fx.location_a.id, 10))
        .await
        .unwrap();
    let movement = svc
        .transfer_stock(transfer(
            fx.component.id,
            fx.location_a.id,
            fx.location_b.id,
            4,
        ))
        .await
        .unwrap();

    let by_location: HashMap<Uuid, i32> = movement
        .items
        .iter()
        .map(|i| (i.location_id, i.quantity))
        .collect();
    assert_eq!(by_location[&fx.location_a.id], 6);
    assert_eq!(by_location[&fx.location_b.id], 4);
    assert_eq!(movement.transaction.from_location_id, Some(fx.location_a.id));
    assert_eq!(movement.transaction.to_location_id, Some(fx.location_b.id));
}

#[tokio::test]
async fn transfer_to_same_location_is_invalid() {
    let (state, _rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;
    let svc = &state.services.transactions;

    svc.add_stock(add(fx.component.id, fx.location_a.id, 10))
        .await
        .unwrap();
    let err = svc
        .transfer_stock(transfer(
            fx.component.id,
            fx.location_a.id,
            fx.location_a.id,
            2,
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn overdraw_fails_and_leaves_state_unchanged() {
    let (state, _rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;
    let svc = &state.services.transactions;

    svc.add_stock(add(fx.component.id, fx.location_a.id, 3))
        .await
        .unwrap();

    let err = svc
        .consume_stock(consume(fx.component.id, fx.location_a.id, 5))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let err = svc
        .transfer_stock(transfer(
            fx.component.id,
            fx.location_a.id,
            fx.location_b.id,
            5,
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // Consuming from a location that has no stock row at all reads as zero.
    let err = svc
        .consume_stock(consume(fx.component.id, fx.location_b.id, 1))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(ref msg) if msg.contains("available 0"));

    let item = state
        .services
        .inventory
        .get_item(fx.component.id, fx.location_a.id)
        .await
        .unwrap()
        .expect("stock row should exist");
    assert_eq!(item.quantity, 3);

    // Only the successful add reached the ledger.
    let ledger = svc.list_transactions(None, 50, 0).await.unwrap();
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn production_restock_scenario() {
    let (state, mut rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;
    let svc = &state.services.transactions;

    // Stock up central; the default minimum is 5.
    svc.add_stock(add(fx.component.id, fx.location_a.id, 10))
        .await
        .unwrap();

    let err = svc
        .add_stock(add(fx.component.id, fx.location_a.id, 0))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    svc.transfer_stock(transfer(
        fx.component.id,
        fx.location_a.id,
        fx.location_b.id,
        4,
    ))
    .await
    .unwrap();

    // 6 -> 3 crosses the threshold of 5.
    let movement = svc
        .consume_stock(consume(fx.component.id, fx.location_a.id, 3))
        .await
        .unwrap();
    assert_eq!(movement.low_stock.len(), 1);
    assert_eq!(movement.low_stock[0].location_id, fx.location_a.id);

    let err = svc
        .transfer_stock(transfer(
            fx.component.id,
            fx.location_a.id,
            fx.location_b.id,
            10,
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let a = state
        .services
        .inventory
        .get_item(fx.component.id, fx.location_a.id)
        .await
        .unwrap()
        .unwrap();
    let b = state
        .services
        .inventory
        .get_item(fx.component.id, fx.location_b.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(a.quantity, 3);
    assert_eq!(b.quantity, 4);

    let low_stock_events = drain_events(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, Event::LowStockDetected { .. }))
        .count();
    assert_eq!(low_stock_events, 1);
}

#[tokio::test]
async fn low_stock_fires_once_per_crossing() {
    let (state, mut rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;
    let svc = &state.services.transactions;

    svc.add_stock(add(fx.component.id, fx.location_a.id, 8))
        .await
        .unwrap();

    // 8 -> 4 crosses.
    svc.consume_stock(consume(fx.component.id, fx.location_a.id, 4))
        .await
        .unwrap();
    // 4 -> 2 stays below; no second signal.
    svc.consume_stock(consume(fx.component.id, fx.location_a.id, 2))
        .await
        .unwrap();
    // Back above the threshold.
    svc.add_stock(add(fx.component.id, fx.location_a.id, 6))
        .await
        .unwrap();
    // 8 -> 5 crosses again (at-or-below counts).
    svc.consume_stock(consume(fx.component.id, fx.location_a.id, 3))
        .await
        .unwrap();

    let low_stock_events = drain_events(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, Event::LowStockDetected { .. }))
        .count();
    assert_eq!(low_stock_events, 2);
}

#[tokio::test]
async fn concurrent_consumers_cannot_overdraw() {
    let (state, _rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;
    let svc = state.services.transactions.clone();

    svc.add_stock(add(fx.component.id, fx.location_a.id, 10))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let svc = svc.clone();
        let cmd = consume(fx.component.id, fx.location_a.id, 7);
        handles.push(tokio::spawn(async move { svc.consume_stock(cmd).await }));
    }

    let mut successes = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(ServiceError::InsufficientStock(_)) => insufficient += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(insufficient, 1);

    let item = state
        .services
        .inventory
        .get_item(fx.component.id, fx.location_a.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.quantity, 3);
}

#[tokio::test]
async fn ledger_replay_reproduces_current_quantities() {
    let (state, _rx) = test_state().await;
    let fx = seed_stock_fixture(&state).await;
    let svc = &state.services.transactions;

    svc.add_stock(add(fx.component.id, fx.location_a.id, 20))
        .await
        .unwrap();
    svc.transfer_stock(transfer(
        fx.component.id,
        fx.location_a.id,
        fx.location_b.id,
        8,
    ))
    .await
    .unwrap();
    svc.consume_stock(consume(fx.component.id, fx.location_b.id, 5))
        .await
        .unwrap();
    svc.add_stock(add(fx.component.id, fx.location_b.id, 2))
        .await
        .unwrap();

    // Replay the ledger from scratch.
    let mut replayed: HashMap<(Uuid, Uuid), i32> = HashMap::new();
    let mut ledger = svc.list_transactions(None, 100, 0).await.unwrap();
    ledger.sort_by_key(|t| t.created_at);
    for entry in &ledger {
        let kind = TransactionType::parse(&entry.transaction_type).unwrap();
        apply(&mut replayed, entry, kind);
    }

    for row in state.services.inventory.get_inventory(None).await.unwrap() {
        let key = (row.item.component_id, row.item.location_id);
        assert_eq!(replayed.get(&key).copied().unwrap_or(0), row.item.quantity);
    }
}

fn apply(
    quantities: &mut HashMap<(Uuid, Uuid), i32>,
    entry: &inventory_transaction::Model,
    kind: TransactionType,
) {
    match kind {
        TransactionType::Add => {
            let to = entry.to_location_id.unwrap();
            *quantities.entry((entry.component_id, to)).or_insert(0) += entry.quantity;
        }
        TransactionType::Transfer => {
            let from = entry.from_location_id.unwrap();
            let to = entry.to_location_id.unwrap();
            *quantities.entry((entry.component_id, from)).or_insert(0) -= entry.quantity;
            *quantities.entry((entry.component_id, to)).or_insert(0) += entry.quantity;
        }
        TransactionType::Consume => {
            let from = entry.from_location_id.unwrap();
            *quantities.entry((entry.component_id, from)).or_insert(0) -= entry.quantity;
        }
    }
}
