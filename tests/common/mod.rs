#![allow(dead_code)]

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use uuid::Uuid;

use wb_tracks_api::config::AppConfig;
use wb_tracks_api::entities::inventory_location::LocationType;
use wb_tracks_api::entities::{component, facility, inventory_location};
use wb_tracks_api::events::{ChangeBroadcaster, Event, EventSender};
use wb_tracks_api::migrator::Migrator;
use wb_tracks_api::AppState;

/// Fresh in-memory database with the schema applied. A single connection is
/// required: every pooled SQLite `:memory:` connection is its own database.
pub async fn test_db() -> Arc<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("in-memory database should connect");
    Migrator::up(&db, None)
        .await
        .expect("migrations should apply");
    Arc::new(db)
}

/// Full application state plus the raw domain-event receiver, so tests can
/// assert on what the services emitted without a background processor.
pub async fn test_state() -> (AppState, mpsc::Receiver<Event>) {
    let db = test_db().await;
    let (tx, rx) = mpsc::channel(64);
    let event_sender = EventSender::new(tx);
    let broadcaster = ChangeBroadcaster::new(16);
    let cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 0);
    let state = AppState::new(db, cfg, event_sender, broadcaster);
    (state, rx)
}

pub async fn seed_component(state: &AppState, number: &str) -> component::Model {
    use sea_orm::ActiveModelTrait;

    component::ActiveModel {
        id: Set(Uuid::new_v4()),
        component_number: Set(number.to_string()),
        description: Set(format!("test component {}", number)),
        active: Set(true),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await
    .expect("component insert")
}

pub async fn seed_facility(state: &AppState, code: &str) -> facility::Model {
    use sea_orm::ActiveModelTrait;

    facility::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(format!("facility {}", code)),
        active: Set(true),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await
    .expect("facility insert")
}

pub async fn seed_location(
    state: &AppState,
    facility_id: Uuid,
    name: &str,
) -> inventory_location::Model {
    use sea_orm::ActiveModelTrait;

    inventory_location::ActiveModel {
        id: Set(Uuid::new_v4()),
        facility_id: Set(facility_id),
        name: Set(name.to_string()),
        location_type: Set(LocationType::Warehouse.to_string()),
        active: Set(true),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await
    .expect("location insert")
}

/// One component plus two locations in the same facility; the common fixture
/// for stock-movement tests.
pub struct StockFixture {
    pub component: component::Model,
    pub location_a: inventory_location::Model,
    pub location_b: inventory_location::Model,
}

pub async fn seed_stock_fixture(state: &AppState) -> StockFixture {
    let component = seed_component(state, "C-1001").await;
    let facility = seed_facility(state, "MAIN").await;
    let location_a = seed_location(state, facility.id, "central").await;
    let location_b = seed_location(state, facility.id, "line-1").await;
    StockFixture {
        component,
        location_a,
        location_b,
    }
}

/// Drains every currently queued event without blocking.
pub fn drain_events(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
