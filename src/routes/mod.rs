pub mod users;
pub mod medicines;
pub mod customers;
pub mod suppliers;
pub mod invoices;
pub mod imports;
pub mod inventory;
pub mod interactions;

use axum::Router;
use crate::state::AppState;

/// All resource routers; the caller nests them under `/api`.
pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(users::routes(state.clone()))
        .merge(medicines::routes(state.clone()))
        .merge(customers::routes(state.clone()))
        .merge(suppliers::routes(state.clone()))
        .merge(invoices::routes(state.clone()))
        .merge(imports::routes(state.clone()))
        .merge(inventory::routes(state.clone()))
        .merge(interactions::routes(state))
}
