//! The only path that changes `medicines.stock`.
//!
//! Every call writes the stock change and exactly one log row through the
//! same unit of work, so on-hand stock always equals the sum of the logged
//! deltas for that medicine.
use tracing::warn;

use crate::error::AppError;
use crate::ledger::{LedgerTx, StockUpdate};
use crate::models::inventory_log::{Direction, InventoryLog, InventoryLogType, NewInventoryLog};

#[derive(Debug, Clone)]
pub struct StockChange {
    pub medicine_id: i64,
    pub delta: i32,
    pub kind: InventoryLogType,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub user_id: i64,
}

#[derive(Debug)]
pub struct AppliedChange {
    pub stock: i32,
    pub log: InventoryLog,
}

pub async fn apply_delta<L>(tx: &mut L, change: StockChange) -> Result<AppliedChange, AppError>
where
    L: LedgerTx + ?Sized,
{
    if change.delta == 0 {
        return Err(AppError::validation("Stock change cannot be zero"));
    }
    let sign_matches = match change.kind.direction() {
        Direction::Increase => change.delta > 0,
        Direction::Decrease => change.delta < 0,
    };
    if !sign_matches {
        return Err(AppError::validation(format!(
            "{} cannot carry a delta of {}",
            change.kind, change.delta
        )));
    }

    let stock = match tx.shift_stock(change.medicine_id, change.delta).await? {
        StockUpdate::Applied { stock } => stock,
        StockUpdate::Missing => {
            return Err(AppError::not_found(format!("Medicine {} not found", change.medicine_id)));
        }
        StockUpdate::Insufficient { available } => {
            warn!(
                medicine_id = change.medicine_id,
                delta = change.delta,
                available,
                kind = %change.kind,
                "Rejected stock change"
            );
            return Err(AppError::insufficient_stock(format!(
                "Not enough stock for medicine {}: available {}, requested {}",
                change.medicine_id,
                available,
                -i64::from(change.delta)
            )));
        }
    };

    let log = tx
        .insert_log(&NewInventoryLog {
            medicine_id: change.medicine_id,
            user_id: change.user_id,
            log_type: change.kind,
            quantity: change.delta,
            reference: change.reference,
            note: change.note,
        })
        .await?;

    Ok(AppliedChange { stock, log })
}
