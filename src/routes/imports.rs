use axum::{
    middleware,
    routing::get,
    Router,
};
use crate::handlers::import::{list_imports, get_import, create_import, delete_import};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/imports", get(list_imports).post(create_import))
        .route("/imports/{id}", get(get_import).delete(delete_import))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
