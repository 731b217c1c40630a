use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::instrument;

use crate::auth::actor::ActorContext;
use crate::dtos::customer::{CustomerListQuery, CustomerRequest};
use crate::dtos::pagination::{Page, PageQuery};
use crate::error::AppError;
use crate::ledger::PgLedger;
use crate::models::customer::Customer;
use crate::models::invoice::Invoice;
use crate::queries;
use crate::services::{catalog, lookup};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListQuery>,
) -> Result<Json<Page<Customer>>, AppError> {
    Ok(Json(queries::catalog::list_customers(&state.db_pool, &params).await?))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let customer = catalog::create_customer(&mut tx, &req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let customer = lookup::customer(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(customer))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let customer = catalog::update_customer(&mut tx, id, &req).await?;
    tx.commit().await?;

    Ok(Json(customer))
}

#[instrument(skip(state), fields(user_id = actor.user_id))]
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    catalog::delete_customer(&mut tx, id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn customer_invoices(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page<Invoice>>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    lookup::customer(&mut tx, id).await?;
    tx.commit().await?;

    Ok(Json(queries::catalog::customer_invoices(&state.db_pool, id, params.pagination()).await?))
}
