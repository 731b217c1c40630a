use axum::{
    middleware,
    routing::get,
    Router,
};
use crate::handlers::invoice::{
    list_invoices, get_invoice, create_invoice, update_invoice, delete_invoice
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/{id}", get(get_invoice).put(update_invoice).delete(delete_invoice))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
