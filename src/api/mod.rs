pub mod accounts;
pub mod events;
pub mod health;
pub mod positions;
pub mod vaults;

use crate::db::Repository;
use crate::ingest::Ingestor;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, ingestor: Arc<Ingestor>) -> Self {
        Self { repo, ingestor }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/events", post(events::ingest_events))
        .route("/v1/vaults", get(vaults::list_vaults))
        .route("/v1/vaults/:address", get(vaults::get_vault))
        .route("/v1/positions", get(positions::get_positions))
        .route("/v1/accounts/:address", get(accounts::get_account))
        .layer(cors)
        .with_state(state)
}
