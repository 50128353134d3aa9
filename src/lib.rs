//! WB-Tracks API Library
//!
//! Core functionality for the WB-Tracks inventory tracking backend.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use sea_orm::DatabaseConnection;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub inventory: services::inventory::InventoryService,
    pub transactions: services::transactions::TransactionService,
    pub barcode: services::barcode::BarcodeService,
    pub components: services::components::ComponentService,
    pub locations: services::locations::LocationService,
    pub users: services::users::UserService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: events::EventSender,
        config: &config::AppConfig,
    ) -> Self {
        Self {
            inventory: services::inventory::InventoryService::new(db.clone()),
            transactions: services::transactions::TransactionService::new(
                db.clone(),
                event_sender.clone(),
                config.default_min_stock_level,
            ),
            barcode: services::barcode::BarcodeService::new(
                db.clone(),
                config.temp_barcode_ttl_hours,
            ),
            components: services::components::ComponentService::new(
                db.clone(),
                event_sender.clone(),
            ),
            locations: services::locations::LocationService::new(db.clone()),
            users: services::users::UserService::new(db, event_sender),
        }
    }
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub event_sender: events::EventSender,
    pub broadcaster: events::ChangeBroadcaster,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
        broadcaster: events::ChangeBroadcaster,
    ) -> Self {
        let services = AppServices::new(db.clone(), event_sender.clone(), &config);
        Self {
            db,
            config: Arc::new(config),
            event_sender,
            broadcaster,
            services,
        }
    }
}

/// All routes under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/inventory", get(handlers::inventory::list_inventory))
        .route(
            "/inventory/low-stock",
            get(handlers::inventory::list_low_stock),
        )
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions),
        )
        .route(
            "/transactions/add",
            post(handlers::transactions::add_stock),
        )
        .route(
            "/transactions/transfer",
            post(handlers::transactions::transfer_stock),
        )
        .route(
            "/transactions/consume",
            post(handlers::transactions::consume_stock),
        )
        .route("/barcode/lookup", post(handlers::barcode::lookup))
        .route(
            "/barcode/temporary",
            post(handlers::barcode::create_temporary),
        )
        .route(
            "/components",
            get(handlers::components::list_components)
                .post(handlers::components::create_component),
        )
        .route(
            "/components/:id",
            get(handlers::components::get_component)
                .put(handlers::components::update_component),
        )
        .route(
            "/components/:id/deactivate",
            post(handlers::components::deactivate_component),
        )
        .route(
            "/facilities",
            get(handlers::locations::list_facilities)
                .post(handlers::locations::create_facility),
        )
        .route(
            "/locations",
            get(handlers::locations::list_locations)
                .post(handlers::locations::create_location),
        )
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/users/:id/role", put(handlers::users::set_role))
        .route(
            "/users/:id/deactivate",
            post(handlers::users::deactivate_user),
        )
        .route("/auth/login", post(handlers::users::login))
        .route("/events", get(handlers::events::event_stream))
}

/// The full application router with the `/api` prefix and docs mounted.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(openapi::swagger_routes())
        .with_state(state)
}
