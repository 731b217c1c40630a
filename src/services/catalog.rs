//! Medicines, customers and suppliers.
use tracing::info;

use super::lookup;
use super::codes::next_code;
use super::stock::{apply_delta, StockChange};
use crate::auth::actor::ActorContext;
use crate::dtos::customer::CustomerRequest;
use crate::dtos::medicine::MedicineRequest;
use crate::dtos::supplier::SupplierRequest;
use crate::error::AppError;
use crate::ledger::{LedgerTx, Sequence};
use crate::models::customer::Customer;
use crate::models::inventory_log::InventoryLogType;
use crate::models::medicine::Medicine;
use crate::models::supplier::Supplier;

// ---- medicines ----

pub async fn create_medicine<L>(tx: &mut L, actor: &ActorContext, req: &MedicineRequest) -> Result<Medicine, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("create medicines")?;
    req.validate()?;

    let code = next_code(tx, Sequence::Medicine).await?;
    let mut medicine = tx.insert_medicine(&code, &req.fields()).await?;

    // The opening balance goes through the stock service so it is logged.
    if let Some(stock) = req.stock.filter(|s| *s > 0) {
        let applied = apply_delta(
            tx,
            StockChange {
                medicine_id: medicine.id,
                delta: stock,
                kind: InventoryLogType::Initial,
                reference: Some(code.clone()),
                note: Some("Opening balance".to_string()),
                user_id: actor.user_id,
            },
        )
        .await?;
        medicine.stock = applied.stock;
    }

    info!(medicine_id = medicine.id, code = %medicine.code, stock = medicine.stock, "Medicine created");
    Ok(medicine)
}

pub async fn update_medicine<L>(
    tx: &mut L,
    actor: &ActorContext,
    id: i64,
    req: &MedicineRequest,
) -> Result<Medicine, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("update medicines")?;
    req.validate()?;
    if req.stock.is_some() {
        return Err(AppError::validation(
            "Stock changes only through imports, invoices or inventory adjustments",
        ));
    }

    tx.update_medicine(id, &req.fields())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Medicine {id} not found")))
}

pub async fn delete_medicine<L>(tx: &mut L, actor: &ActorContext, id: i64) -> Result<(), AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("delete medicines")?;
    let medicine = lookup::medicine(tx, id).await?;

    if tx.medicine_in_use(id).await? {
        return Err(AppError::conflict(format!(
            "Medicine {} appears on invoices or imports and cannot be deleted",
            medicine.code
        )));
    }
    if !tx.medicine_logs(id).await?.is_empty() {
        return Err(AppError::conflict(format!(
            "Medicine {} has stock history and cannot be deleted",
            medicine.code
        )));
    }

    tx.delete_medicine(id).await?;
    info!(medicine_id = id, code = %medicine.code, "Medicine deleted");
    Ok(())
}

// ---- customers ----

pub async fn create_customer<L>(tx: &mut L, req: &CustomerRequest) -> Result<Customer, AppError>
where
    L: LedgerTx + ?Sized,
{
    req.validate()?;
    let code = next_code(tx, Sequence::Customer).await?;
    let customer = tx.insert_customer(&code, &req.fields()).await?;
    info!(customer_id = customer.id, code = %customer.code, "Customer created");
    Ok(customer)
}

pub async fn update_customer<L>(tx: &mut L, id: i64, req: &CustomerRequest) -> Result<Customer, AppError>
where
    L: LedgerTx + ?Sized,
{
    req.validate()?;
    tx.update_customer(id, &req.fields())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id} not found")))
}

pub async fn delete_customer<L>(tx: &mut L, id: i64) -> Result<(), AppError>
where
    L: LedgerTx + ?Sized,
{
    let customer = lookup::customer(tx, id).await?;
    lookup::ensure_customer_deletable(tx, id).await?;
    tx.delete_customer(id).await?;
    info!(customer_id = id, code = %customer.code, "Customer deleted");
    Ok(())
}

// ---- suppliers ----

pub async fn create_supplier<L>(tx: &mut L, actor: &ActorContext, req: &SupplierRequest) -> Result<Supplier, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("create suppliers")?;
    req.validate()?;
    let code = next_code(tx, Sequence::Supplier).await?;
    let supplier = tx.insert_supplier(&code, &req.fields()).await?;
    info!(supplier_id = supplier.id, code = %supplier.code, "Supplier created");
    Ok(supplier)
}

pub async fn update_supplier<L>(
    tx: &mut L,
    actor: &ActorContext,
    id: i64,
    req: &SupplierRequest,
) -> Result<Supplier, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("update suppliers")?;
    req.validate()?;
    tx.update_supplier(id, &req.fields())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Supplier {id} not found")))
}

pub async fn delete_supplier<L>(tx: &mut L, actor: &ActorContext, id: i64) -> Result<(), AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("delete suppliers")?;
    let supplier = lookup::supplier(tx, id).await?;

    let imports = tx.count_supplier_imports(id).await?;
    if imports > 0 {
        return Err(AppError::conflict(format!(
            "Supplier has {imports} import(s) and cannot be deleted"
        )));
    }

    tx.delete_supplier(id).await?;
    info!(supplier_id = id, code = %supplier.code, "Supplier deleted");
    Ok(())
}
