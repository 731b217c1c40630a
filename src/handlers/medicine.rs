use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::instrument;

use crate::auth::actor::ActorContext;
use crate::dtos::medicine::{MedicineListQuery, MedicineRequest};
use crate::dtos::pagination::Page;
use crate::error::AppError;
use crate::ledger::PgLedger;
use crate::models::medicine::Medicine;
use crate::queries;
use crate::services::{catalog, lookup};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_medicines(
    State(state): State<AppState>,
    Query(params): Query<MedicineListQuery>,
) -> Result<Json<Page<Medicine>>, AppError> {
    Ok(Json(queries::catalog::list_medicines(&state.db_pool, &params).await?))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn create_medicine(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(req): Json<MedicineRequest>,
) -> Result<(StatusCode, Json<Medicine>), AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let medicine = catalog::create_medicine(&mut tx, &actor, &req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(medicine)))
}

#[instrument(skip(state))]
pub async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Medicine>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let medicine = lookup::medicine(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(medicine))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn update_medicine(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
    Json(req): Json<MedicineRequest>,
) -> Result<Json<Medicine>, AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let medicine = catalog::update_medicine(&mut tx, &actor, id, &req).await?;
    tx.commit().await?;

    Ok(Json(medicine))
}

#[instrument(skip(state), fields(user_id = actor.user_id))]
pub async fn delete_medicine(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    catalog::delete_medicine(&mut tx, &actor, id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
