use axum::{
    middleware,
    routing::get,
    Router,
};
use crate::handlers::medicine::{
    list_medicines, get_medicine, create_medicine, update_medicine, delete_medicine
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route("/medicines/{id}", get(get_medicine).put(update_medicine).delete(delete_medicine))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
