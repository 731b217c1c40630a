use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use crate::handlers::inventory::{list_stock, adjust_stock, list_logs, medicine_history};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_stock))
        .route("/inventory/adjust", post(adjust_stock))
        .route("/inventory/logs", get(list_logs))
        .route("/inventory/medicines/{id}/history", get(medicine_history))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
