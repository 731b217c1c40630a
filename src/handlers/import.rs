use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::instrument;

use crate::auth::actor::ActorContext;
use crate::dtos::import::{CreateImportRequest, ImportDetail, ImportListQuery, ImportSummary};
use crate::dtos::pagination::Page;
use crate::error::AppError;
use crate::ledger::PgLedger;
use crate::queries;
use crate::services::import;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_imports(
    State(state): State<AppState>,
    Query(params): Query<ImportListQuery>,
) -> Result<Json<Page<ImportSummary>>, AppError> {
    Ok(Json(queries::sales::list_imports(&state.db_pool, &params).await?))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id, supplier_id = req.supplier_id))]
pub async fn create_import(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(req): Json<CreateImportRequest>,
) -> Result<(StatusCode, Json<ImportDetail>), AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let detail = import::create_import(&mut tx, &actor, &req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_import(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ImportDetail>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let detail = import::import_detail(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(detail))
}

#[instrument(skip(state), fields(user_id = actor.user_id))]
pub async fn delete_import(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    import::delete_import(&mut tx, &actor, id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
