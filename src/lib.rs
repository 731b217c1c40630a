pub mod auth;
pub mod config;
pub mod database;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod routes;
pub mod services;
pub mod state;

use axum::{routing::get, Router};

use crate::state::AppState;

/// The full application under the `/api` base path, ready to serve.
pub fn build_app(state: AppState) -> Router {
    let api = routes::create_router(state.clone())
        .route("/", get(|| async { "Pharmacy API" }))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
