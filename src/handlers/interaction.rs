use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::instrument;

use crate::auth::actor::ActorContext;
use crate::dtos::interaction::{
    CheckInteractionRequest, CheckInteractionResponse, InteractionDetail, InteractionListQuery, InteractionRequest,
};
use crate::dtos::pagination::Page;
use crate::error::AppError;
use crate::ledger::PgLedger;
use crate::queries;
use crate::services::interaction;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_interactions(
    State(state): State<AppState>,
    Query(params): Query<InteractionListQuery>,
) -> Result<Json<Page<InteractionDetail>>, AppError> {
    Ok(Json(queries::interactions::list_interactions(&state.db_pool, &params).await?))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn create_interaction(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(req): Json<InteractionRequest>,
) -> Result<(StatusCode, Json<InteractionDetail>), AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let detail = interaction::create_interaction(&mut tx, &actor, &req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_interaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InteractionDetail>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let detail = interaction::get_interaction(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(detail))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn update_interaction(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
    Json(req): Json<InteractionRequest>,
) -> Result<Json<InteractionDetail>, AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let detail = interaction::update_interaction(&mut tx, &actor, id, &req).await?;
    tx.commit().await?;

    Ok(Json(detail))
}

#[instrument(skip(state), fields(user_id = actor.user_id))]
pub async fn delete_interaction(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    interaction::delete_interaction(&mut tx, &actor, id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, req))]
pub async fn check_interaction(
    State(state): State<AppState>,
    Json(req): Json<CheckInteractionRequest>,
) -> Result<Json<CheckInteractionResponse>, AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let result = interaction::check_interaction(&mut tx, &req).await?;
    tx.commit().await?;

    Ok(Json(result))
}
