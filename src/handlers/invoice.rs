use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::instrument;

use crate::auth::actor::ActorContext;
use crate::dtos::invoice::{CreateInvoiceRequest, InvoiceDetail, InvoiceListQuery, InvoiceSummary, UpdateInvoiceRequest};
use crate::dtos::pagination::Page;
use crate::error::AppError;
use crate::ledger::PgLedger;
use crate::models::invoice::Invoice;
use crate::queries;
use crate::services::invoice;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<InvoiceListQuery>,
) -> Result<Json<Page<InvoiceSummary>>, AppError> {
    Ok(Json(queries::sales::list_invoices(&state.db_pool, &params).await?))
}

/// Creates the invoice and takes every line out of stock in one transaction.
#[instrument(skip(state, req), fields(user_id = actor.user_id, lines = req.items.len()))]
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceDetail>), AppError> {
    // Reject malformed input before opening a transaction
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let detail = invoice::create_invoice(&mut tx, &actor, &req).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[instrument(skip(state))]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceDetail>, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let detail = invoice::invoice_detail(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(detail))
}

#[instrument(skip(state, req), fields(user_id = actor.user_id))]
pub async fn update_invoice(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<Invoice>, AppError> {
    req.validate()?;

    let mut tx = PgLedger::begin(&state.db_pool).await?;
    let updated = invoice::update_invoice(&mut tx, &actor, id, &req).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

#[instrument(skip(state), fields(user_id = actor.user_id))]
pub async fn delete_invoice(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let mut tx = PgLedger::begin(&state.db_pool).await?;
    invoice::delete_invoice(&mut tx, &actor, id).await?;
    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
