//! Goods received from suppliers.
use tracing::info;

use super::codes::next_code;
use super::lookup;
use super::stock::{apply_delta, StockChange};
use crate::auth::actor::ActorContext;
use crate::dtos::import::{CreateImportRequest, ImportDetail, ImportLine};
use crate::error::AppError;
use crate::ledger::{LedgerTx, Sequence};
use crate::models::import::{Import, NewImport, NewImportItem};
use crate::models::inventory_log::InventoryLogType;

pub const COMPLETED: &str = "completed";

pub async fn create_import<L>(
    tx: &mut L,
    actor: &ActorContext,
    req: &CreateImportRequest,
) -> Result<ImportDetail, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("create imports")?;
    req.validate()?;

    let supplier = lookup::supplier(tx, req.supplier_id).await?;

    let mut lines = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let medicine = lookup::medicine(tx, item.medicine_id).await?;
        let total = item.total.unwrap_or(f64::from(item.quantity) * item.price);
        lines.push((
            NewImportItem {
                medicine_id: medicine.id,
                lot_number: item.lot_number.trim().to_string(),
                expiry_date: item.expiry_date,
                price: item.price,
                quantity: item.quantity,
                total,
            },
            medicine,
        ));
    }

    let code = next_code(tx, Sequence::Import).await?;
    let import = tx
        .insert_import(&NewImport {
            code: code.clone(),
            supplier_id: supplier.id,
            user_id: actor.user_id,
            status: COMPLETED.to_string(),
            total: lines.iter().map(|(item, _)| item.total).sum(),
            note: req.note.clone(),
        })
        .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (line, medicine) in lines {
        let item = tx.insert_import_item(import.id, &line).await?;
        apply_delta(
            tx,
            StockChange {
                medicine_id: medicine.id,
                delta: line.quantity,
                kind: InventoryLogType::Import,
                reference: Some(code.clone()),
                note: Some(format!("Import from supplier {}", supplier.name)),
                user_id: actor.user_id,
            },
        )
        .await?;
        // Shelf metadata follows the newest delivery.
        tx.set_lot(medicine.id, &line.lot_number, line.expiry_date).await?;
        items.push(ImportLine { item, medicine_code: medicine.code, medicine_name: medicine.name });
    }

    info!(import_id = import.id, code = %import.code, lines = items.len(), total = import.total, "Import created");

    Ok(ImportDetail { import, supplier_name: supplier.name, items })
}

/// Withdraws the imported units and removes the import.
///
/// Fails as a whole when any medicine no longer holds the quantity this
/// import contributed.
pub async fn delete_import<L>(tx: &mut L, actor: &ActorContext, id: i64) -> Result<(), AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("delete imports")?;

    let import = tx
        .lock_import(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Import {id} not found")))?;
    let items = tx.import_items(id).await?;

    for item in &items {
        apply_delta(
            tx,
            StockChange {
                medicine_id: item.medicine_id,
                delta: -item.quantity,
                kind: InventoryLogType::ImportCancel,
                reference: Some(import.code.clone()),
                note: Some(format!("Import {} deleted", import.code)),
                user_id: actor.user_id,
            },
        )
        .await?;
    }

    tx.delete_import_items(id).await?;
    if !tx.delete_import(id).await? {
        return Err(AppError::not_found(format!("Import {id} not found")));
    }

    info!(import_id = id, code = %import.code, withdrawn_lines = items.len(), "Import deleted");
    Ok(())
}

pub async fn import_detail<L>(tx: &mut L, id: i64) -> Result<ImportDetail, AppError>
where
    L: LedgerTx + ?Sized,
{
    let import = find(tx, id).await?;
    let supplier = lookup::supplier(tx, import.supplier_id).await?;

    let mut items = Vec::new();
    for item in tx.import_items(id).await? {
        let medicine = lookup::medicine(tx, item.medicine_id).await?;
        items.push(ImportLine { item, medicine_code: medicine.code, medicine_name: medicine.name });
    }

    Ok(ImportDetail { import, supplier_name: supplier.name, items })
}

async fn find<L>(tx: &mut L, id: i64) -> Result<Import, AppError>
where
    L: LedgerTx + ?Sized,
{
    tx.get_import(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Import {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::auth::actor::Role;
    use crate::dtos::import::ImportItemRequest;
    use crate::ledger::MemoryLedger;
    use crate::models::medicine::MedicineFields;
    use crate::models::supplier::SupplierFields;

    fn manager() -> ActorContext {
        ActorContext::new(2, Role::InventoryManager, "stock")
    }

    async fn setup(ledger: &MemoryLedger) -> (i64, i64) {
        let mut tx = ledger.begin().await;
        let m = tx
            .insert_medicine("MED-1001", &MedicineFields { name: "Metformin".into(), category: "Diabetes".into(), ..Default::default() })
            .await
            .unwrap();
        let s = tx
            .insert_supplier("SUP-1001", &SupplierFields { name: "DHG Pharma".into(), ..Default::default() })
            .await
            .unwrap();
        tx.commit();
        (m.id, s.id)
    }

    fn request(supplier_id: i64, medicine_id: i64, quantity: i32, lot: &str) -> CreateImportRequest {
        CreateImportRequest {
            supplier_id,
            note: None,
            items: vec![ImportItemRequest {
                medicine_id,
                quantity,
                price: 0.5,
                lot_number: lot.into(),
                expiry_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
                total: None,
            }],
        }
    }

    #[tokio::test]
    async fn import_adds_stock_and_stamps_the_lot() {
        let ledger = MemoryLedger::new();
        let (m, s) = setup(&ledger).await;
        let mut tx = ledger.begin().await;

        let detail = create_import(&mut tx, &manager(), &request(s, m, 100, "LOT-A")).await.unwrap();
        assert_eq!(detail.import.code, "IMP-000001");
        assert_eq!(detail.import.total, 50.0);
        assert_eq!(detail.import.status, COMPLETED);

        let medicine = tx.get_medicine(m).await.unwrap().unwrap();
        assert_eq!(medicine.stock, 100);
        assert_eq!(medicine.lot_number.as_deref(), Some("LOT-A"));
        assert_eq!(medicine.expiry_date, NaiveDate::from_ymd_opt(2027, 6, 30));
    }

    #[tokio::test]
    async fn cannot_delete_an_import_that_was_sold_through() {
        let ledger = MemoryLedger::new();
        let (m, s) = setup(&ledger).await;
        let mut tx = ledger.begin().await;
        let id = create_import(&mut tx, &manager(), &request(s, m, 10, "LOT-A")).await.unwrap().import.id;
        apply_delta(
            &mut tx,
            StockChange {
                medicine_id: m,
                delta: -4,
                kind: InventoryLogType::Sale,
                reference: None,
                note: None,
                user_id: 3,
            },
        )
        .await
        .unwrap();

        let err = delete_import(&mut tx, &manager(), id).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));
    }

    #[tokio::test]
    async fn cancelling_twice_withdraws_stock_once() {
        let ledger = MemoryLedger::new();
        let (m, s) = setup(&ledger).await;
        let id = {
            let mut tx = ledger.begin().await;
            apply_delta(
                &mut tx,
                StockChange {
                    medicine_id: m,
                    delta: 200,
                    kind: InventoryLogType::Initial,
                    reference: None,
                    note: None,
                    user_id: 2,
                },
            )
            .await
            .unwrap();
            let id = create_import(&mut tx, &manager(), &request(s, m, 50, "LOT-A")).await.unwrap().import.id;
            tx.commit();
            id
        };

        let mut tx = ledger.begin().await;
        delete_import(&mut tx, &manager(), id).await.unwrap();
        tx.commit();

        let mut tx = ledger.begin().await;
        assert!(matches!(delete_import(&mut tx, &manager(), id).await, Err(AppError::NotFound(_))));
        assert_eq!(tx.get_medicine(m).await.unwrap().unwrap().stock, 200);
        assert_eq!(tx.medicine_logs(m).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_supplier_is_not_found() {
        let ledger = MemoryLedger::new();
        let (m, _) = setup(&ledger).await;
        let mut tx = ledger.begin().await;
        let err = create_import(&mut tx, &manager(), &request(404, m, 1, "LOT-A")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn clerks_cannot_import() {
        let ledger = MemoryLedger::new();
        let (m, s) = setup(&ledger).await;
        let mut tx = ledger.begin().await;
        let clerk = ActorContext::new(3, Role::User, "clerk");
        assert!(matches!(
            create_import(&mut tx, &clerk, &request(s, m, 1, "LOT-A")).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
