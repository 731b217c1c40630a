//! Sales workflows. Each function runs inside the caller's unit of work and
//! leaves nothing behind when it fails.
use tracing::info;

use super::codes::next_code;
use super::lookup;
use super::stock::{apply_delta, StockChange};
use crate::auth::actor::ActorContext;
use crate::dtos::invoice::{CreateInvoiceRequest, InvoiceDetail, InvoiceLine, UpdateInvoiceRequest};
use crate::error::AppError;
use crate::ledger::{LedgerTx, Sequence};
use crate::models::inventory_log::InventoryLogType;
use crate::models::invoice::{Invoice, NewInvoice, NewInvoiceItem};

pub const DEFAULT_PAYMENT_METHOD: &str = "CASH";
pub const DEFAULT_STATUS: &str = "completed";

pub async fn create_invoice<L>(
    tx: &mut L,
    actor: &ActorContext,
    req: &CreateInvoiceRequest,
) -> Result<InvoiceDetail, AppError>
where
    L: LedgerTx + ?Sized,
{
    req.validate()?;

    let customer = match req.customer_id {
        Some(id) => Some(lookup::customer(tx, id).await?),
        None => None,
    };

    let code = match req.code.as_deref().map(str::trim) {
        Some(code) => {
            if tx.code_taken(Sequence::Invoice, code).await? {
                return Err(AppError::conflict(format!("Invoice code {code} already exists")));
            }
            code.to_string()
        }
        None => next_code(tx, Sequence::Invoice).await?,
    };

    // Price every line before writing anything
    let mut lines = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let medicine = lookup::medicine(tx, item.medicine_id).await?;
        let price = item.price.unwrap_or(medicine.retail_price);
        let total = item.total.unwrap_or(f64::from(item.quantity) * price);
        lines.push((
            NewInvoiceItem { medicine_id: medicine.id, quantity: item.quantity, price, total },
            medicine,
        ));
    }
    let total = req
        .total
        .unwrap_or_else(|| lines.iter().map(|(item, _)| item.total).sum());

    let invoice = tx
        .insert_invoice(&NewInvoice {
            code: code.clone(),
            customer_id: customer.as_ref().map(|c| c.id),
            user_id: actor.user_id,
            payment_method: req
                .payment_method
                .clone()
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            status: req.status.clone().unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            total,
            note: req.note.clone(),
        })
        .await?;

    let log_note = match &customer {
        Some(c) => format!("Sale to customer {}", c.name),
        None => "Walk-in sale".to_string(),
    };

    let mut items = Vec::with_capacity(lines.len());
    for (line, medicine) in lines {
        let item = tx.insert_invoice_item(invoice.id, &line).await?;
        apply_delta(
            tx,
            StockChange {
                medicine_id: medicine.id,
                delta: -line.quantity,
                kind: InventoryLogType::Sale,
                reference: Some(code.clone()),
                note: Some(log_note.clone()),
                user_id: actor.user_id,
            },
        )
        .await?;
        items.push(InvoiceLine { item, medicine_code: medicine.code, medicine_name: medicine.name });
    }

    info!(
        invoice_id = invoice.id,
        code = %invoice.code,
        lines = items.len(),
        total = invoice.total,
        "Invoice created"
    );

    Ok(InvoiceDetail {
        invoice,
        customer_name: customer.map(|c| c.name),
        items,
    })
}

/// Removes the invoice and puts every sold unit back on the shelf.
pub async fn delete_invoice<L>(tx: &mut L, actor: &ActorContext, id: i64) -> Result<(), AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("delete invoices")?;

    // A concurrent delete of the same invoice waits here, then finds nothing.
    let invoice = tx
        .lock_invoice(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {id} not found")))?;
    let items = tx.invoice_items(id).await?;

    tx.delete_invoice_items(id).await?;
    if !tx.delete_invoice(id).await? {
        return Err(AppError::not_found(format!("Invoice {id} not found")));
    }

    for item in &items {
        apply_delta(
            tx,
            StockChange {
                medicine_id: item.medicine_id,
                delta: item.quantity,
                kind: InventoryLogType::Return,
                reference: Some(invoice.code.clone()),
                note: Some(format!("Invoice {} deleted", invoice.code)),
                user_id: actor.user_id,
            },
        )
        .await?;
    }

    info!(invoice_id = id, code = %invoice.code, restored_lines = items.len(), "Invoice deleted");
    Ok(())
}

pub async fn update_invoice<L>(
    tx: &mut L,
    actor: &ActorContext,
    id: i64,
    req: &UpdateInvoiceRequest,
) -> Result<Invoice, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_inventory_manager("update invoices")?;
    req.validate()?;
    tx.update_invoice(id, &req.changes())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {id} not found")))
}

pub async fn invoice_detail<L>(tx: &mut L, id: i64) -> Result<InvoiceDetail, AppError>
where
    L: LedgerTx + ?Sized,
{
    let invoice = find(tx, id).await?;
    let customer_name = match invoice.customer_id {
        Some(cid) => tx.get_customer(cid).await?.map(|c| c.name),
        None => None,
    };

    let mut items = Vec::new();
    for item in tx.invoice_items(id).await? {
        let medicine = lookup::medicine(tx, item.medicine_id).await?;
        items.push(InvoiceLine { item, medicine_code: medicine.code, medicine_name: medicine.name });
    }

    Ok(InvoiceDetail { invoice, customer_name, items })
}

async fn find<L>(tx: &mut L, id: i64) -> Result<Invoice, AppError>
where
    L: LedgerTx + ?Sized,
{
    tx.get_invoice(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Invoice {id} not found")))
}
