use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::instrument;

use crate::auth::actor::ActorContext;
use crate::dtos::pagination::Page;
use crate::dtos::supplier::{SupplierListQuery, SupplierRequest};
use crate::error::AppError;
use crate::ledger::PgLedger;
use crate::models::supplier::Supplier;
use crate::queries;
use crate::services::{catalog, lookup};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(params): Query<SupplierListQuery>,
) -> Result<Json<Page<Supplier>>, AppError> {
    Ok(Json(queries::catalog::list_suppliers(&state.db_pool, &params).await?))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn create_supplier(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(req): Json<SupplierRequest>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let supplier = catalog::create_supplier(&mut tx, &actor, &req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Supplier>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let supplier = lookup::supplier(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(supplier))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn update_supplier(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
    Json(req): Json<SupplierRequest>,
) -> Result<Json<Supplier>, AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let supplier = catalog::update_supplier(&mut tx, &actor, id, &req).await?;
    tx.commit().await?;

    Ok(Json(supplier))
}

#[instrument(skip(state), fields(user_id = actor.user_id))]
pub async fn delete_supplier(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    catalog::delete_supplier(&mut tx, &actor, id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
