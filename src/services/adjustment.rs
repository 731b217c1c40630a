use tracing::info;

use super::stock::{apply_delta, StockChange};
use crate::auth::actor::ActorContext;
use crate::dtos::inventory::{AdjustStockRequest, AdjustType, AdjustmentResult};
use crate::dtos::non_blank;
use crate::error::AppError;
use crate::ledger::LedgerTx;
use crate::models::inventory_log::InventoryLogType;

/// Manual stock correction. `set` is turned into a signed delta against the
/// stock read under lock, so it logs like `add`/`subtract` would.
pub async fn adjust_stock<L>(
    tx: &mut L,
    actor: &ActorContext,
    req: &AdjustStockRequest,
) -> Result<AdjustmentResult, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("adjust inventory")?;
    req.validate()?;

    let mut medicine = tx
        .lock_medicine(req.medicine_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Medicine {} not found", req.medicine_id)))?;

    let delta = match req.adjust_type {
        AdjustType::Add => req.quantity,
        AdjustType::Subtract => -req.quantity,
        AdjustType::Set => req.quantity - medicine.stock,
    };

    if delta == 0 {
        return Ok(AdjustmentResult { medicine, delta, log: None });
    }

    let kind = if delta > 0 {
        InventoryLogType::AdjustmentAdd
    } else {
        InventoryLogType::AdjustmentSubtract
    };

    let applied = apply_delta(
        tx,
        StockChange {
            medicine_id: medicine.id,
            delta,
            kind,
            reference: None,
            note: Some(non_blank(&req.reason).unwrap_or_else(|| "Inventory adjustment".to_string())),
            user_id: actor.user_id,
        },
    )
    .await?;

    info!(medicine_id = medicine.id, delta, stock = applied.stock, kind = %kind, "Stock adjusted");

    medicine.stock = applied.stock;
    Ok(AdjustmentResult { medicine, delta, log: Some(applied.log) })
}
