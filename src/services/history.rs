use super::lookup;
use crate::dtos::inventory::{HistoryEntry, MedicineHistory};
use crate::error::AppError;
use crate::ledger::LedgerTx;

/// Every logged movement of one medicine, oldest first, with the balance
/// after each row.
pub async fn medicine_history<L>(tx: &mut L, medicine_id: i64) -> Result<MedicineHistory, AppError>
where
    L: LedgerTx + ?Sized,
{
    let medicine = lookup::medicine(tx, medicine_id).await?;
    let logs = tx.medicine_logs(medicine_id).await?;

    let mut balance: i64 = 0;
    let entries: Vec<HistoryEntry> = logs
        .into_iter()
        .map(|log| {
            balance += i64::from(log.quantity);
            HistoryEntry { label: log.log_type.label(), balance, log }
        })
        .collect();

    Ok(MedicineHistory {
        medicine_id: medicine.id,
        code: medicine.code,
        name: medicine.name,
        stock: medicine.stock,
        logged_total: balance,
        consistent: balance == i64::from(medicine.stock),
        entries,
    })
}
