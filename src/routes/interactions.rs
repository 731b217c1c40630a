use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use crate::handlers::interaction::{
    list_interactions, get_interaction, create_interaction, update_interaction, delete_interaction,
    check_interaction,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/interactions", get(list_interactions).post(create_interaction))
        .route("/interactions/check", post(check_interaction))
        .route("/interactions/{id}", get(get_interaction).put(update_interaction).delete(delete_interaction))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
