use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use tracing::instrument;

use crate::auth::actor::ActorContext;
use crate::dtos::inventory::{AdjustStockRequest, AdjustmentResult, InventoryListQuery, LogEntry, LogListQuery, MedicineHistory};
use crate::dtos::pagination::Page;
use crate::error::AppError;
use crate::ledger::PgLedger;
use crate::models::medicine::Medicine;
use crate::queries;
use crate::services::{adjustment, history};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_stock(
    State(state): State<AppState>,
    Query(params): Query<InventoryListQuery>,
) -> Result<Json<Page<Medicine>>, AppError> {
    Ok(Json(queries::inventory::list_stock(&state.db_pool, &params).await?))
}

#[instrument(skip(state), fields(user_id = actor.user_id))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<AdjustmentResult>, AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let result = adjustment::adjust_stock(&mut tx, &actor, &req).await?;
    tx.commit().await?;

    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LogListQuery>,
) -> Result<Json<Page<LogEntry>>, AppError> {
    Ok(Json(queries::inventory::list_logs(&state.db_pool, &params).await?))
}

#[instrument(skip(state))]
pub async fn medicine_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MedicineHistory>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let history = history::medicine_history(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(history))
}
