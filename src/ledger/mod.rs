//! Storage seam for the inventory core.
//!
//! A [`LedgerTx`] is one open unit of work. Workflows take it as an explicit
//! `&mut` parameter, so the transaction boundary is owned by the caller:
//! begin a handle, run one or more operations, then `commit()`. Dropping a
//! handle without committing discards everything written through it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::customer::{Customer, CustomerFields};
use crate::models::import::{Import, ImportItem, NewImport, NewImportItem};
use crate::models::interaction::{Interaction, InteractionFields};
use crate::models::inventory_log::{InventoryLog, NewInventoryLog};
use crate::models::invoice::{Invoice, InvoiceChanges, InvoiceItem, NewInvoice, NewInvoiceItem};
use crate::models::medicine::{Medicine, MedicineFields};
use crate::models::supplier::{Supplier, SupplierFields};

pub use memory::{MemoryLedger, MemoryTx};
pub use postgres::PgLedger;

/// Reported by every backend when a stock change would leave the `i32` range.
pub const STOCK_OUT_OF_RANGE: &str = "Stock would exceed the storable maximum";

/// Outcome of a conditional stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    Applied { stock: i32 },
    Insufficient { available: i32 },
    Missing,
}

/// Entities that carry a generated human-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Medicine,
    Customer,
    Supplier,
    Invoice,
    Import,
}

impl Sequence {
    /// Renders the `n`-th code (1-based) of this sequence.
    pub fn format(&self, n: i64) -> String {
        match self {
            Sequence::Medicine => format!("MED-{}", 1000 + n),
            Sequence::Supplier => format!("SUP-{}", 1000 + n),
            Sequence::Customer => format!("CUS-{:04}", n),
            Sequence::Invoice => format!("INV-{:05}", n),
            Sequence::Import => format!("IMP-{:06}", n),
        }
    }

    /// Key for the transaction-scoped advisory lock guarding this sequence.
    pub(crate) fn lock_key(&self) -> i64 {
        // "PHRM" in the high bytes keeps these clear of other advisory lock users.
        const BASE: i64 = 0x5048_524D_0000_0000;
        BASE
            + match self {
                Sequence::Medicine => 1,
                Sequence::Customer => 2,
                Sequence::Supplier => 3,
                Sequence::Invoice => 4,
                Sequence::Import => 5,
            }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            Sequence::Medicine => "medicines",
            Sequence::Customer => "customers",
            Sequence::Supplier => "suppliers",
            Sequence::Invoice => "invoices",
            Sequence::Import => "imports",
        }
    }
}

#[async_trait]
pub trait LedgerTx: Send {
    // ---- codes ----
    /// Serializes code generation for `seq` until the unit of work ends.
    async fn lock_sequence(&mut self, seq: Sequence) -> Result<(), AppError>;
    async fn count_rows(&mut self, seq: Sequence) -> Result<i64, AppError>;
    async fn code_taken(&mut self, seq: Sequence, code: &str) -> Result<bool, AppError>;

    // ---- medicines ----
    async fn insert_medicine(&mut self, code: &str, fields: &MedicineFields) -> Result<Medicine, AppError>;
    async fn get_medicine(&mut self, id: i64) -> Result<Option<Medicine>, AppError>;
    /// Reads a medicine and holds it against concurrent stock changes until the unit of work ends.
    async fn lock_medicine(&mut self, id: i64) -> Result<Option<Medicine>, AppError>;
    async fn find_medicines_by_name(&mut self, name: &str) -> Result<Vec<Medicine>, AppError>;
    async fn update_medicine(&mut self, id: i64, fields: &MedicineFields) -> Result<Option<Medicine>, AppError>;
    /// True while any invoice or import line references the medicine.
    async fn medicine_in_use(&mut self, id: i64) -> Result<bool, AppError>;
    /// Removes the medicine with its interactions. Log rows are never removed.
    async fn delete_medicine(&mut self, id: i64) -> Result<bool, AppError>;
    /// Adds `delta` to stock in one conditional step; never lets stock drop below zero.
    async fn shift_stock(&mut self, id: i64, delta: i32) -> Result<StockUpdate, AppError>;
    async fn set_lot(&mut self, id: i64, lot_number: &str, expiry_date: NaiveDate) -> Result<(), AppError>;

    // ---- customers ----
    async fn insert_customer(&mut self, code: &str, fields: &CustomerFields) -> Result<Customer, AppError>;
    async fn get_customer(&mut self, id: i64) -> Result<Option<Customer>, AppError>;
    async fn update_customer(&mut self, id: i64, fields: &CustomerFields) -> Result<Option<Customer>, AppError>;
    async fn count_customer_invoices(&mut self, id: i64) -> Result<i64, AppError>;
    async fn delete_customer(&mut self, id: i64) -> Result<bool, AppError>;

    // ---- suppliers ----
    async fn insert_supplier(&mut self, code: &str, fields: &SupplierFields) -> Result<Supplier, AppError>;
    async fn get_supplier(&mut self, id: i64) -> Result<Option<Supplier>, AppError>;
    async fn update_supplier(&mut self, id: i64, fields: &SupplierFields) -> Result<Option<Supplier>, AppError>;
    async fn count_supplier_imports(&mut self, id: i64) -> Result<i64, AppError>;
    async fn delete_supplier(&mut self, id: i64) -> Result<bool, AppError>;

    // ---- invoices ----
    async fn insert_invoice(&mut self, invoice: &NewInvoice) -> Result<Invoice, AppError>;
    async fn insert_invoice_item(&mut self, invoice_id: i64, item: &NewInvoiceItem) -> Result<InvoiceItem, AppError>;
    async fn get_invoice(&mut self, id: i64) -> Result<Option<Invoice>, AppError>;
    /// Reads an invoice and holds it against concurrent deletion until the unit of work ends.
    async fn lock_invoice(&mut self, id: i64) -> Result<Option<Invoice>, AppError>;
    async fn invoice_items(&mut self, invoice_id: i64) -> Result<Vec<InvoiceItem>, AppError>;
    async fn update_invoice(&mut self, id: i64, changes: &InvoiceChanges) -> Result<Option<Invoice>, AppError>;
    async fn delete_invoice_items(&mut self, invoice_id: i64) -> Result<u64, AppError>;
    async fn delete_invoice(&mut self, id: i64) -> Result<bool, AppError>;

    // ---- imports ----
    async fn insert_import(&mut self, import: &NewImport) -> Result<Import, AppError>;
    async fn insert_import_item(&mut self, import_id: i64, item: &NewImportItem) -> Result<ImportItem, AppError>;
    async fn get_import(&mut self, id: i64) -> Result<Option<Import>, AppError>;
    async fn lock_import(&mut self, id: i64) -> Result<Option<Import>, AppError>;
    async fn import_items(&mut self, import_id: i64) -> Result<Vec<ImportItem>, AppError>;
    async fn delete_import_items(&mut self, import_id: i64) -> Result<u64, AppError>;
    async fn delete_import(&mut self, id: i64) -> Result<bool, AppError>;

    // ---- inventory log (append-only) ----
    async fn insert_log(&mut self, log: &NewInventoryLog) -> Result<InventoryLog, AppError>;
    /// Oldest first.
    async fn medicine_logs(&mut self, medicine_id: i64) -> Result<Vec<InventoryLog>, AppError>;

    // ---- interactions ----
    /// Finds a row linking `a` and `b` in either order, ignoring `exclude`.
    async fn find_interaction_pair(&mut self, a: i64, b: i64, exclude: Option<i64>) -> Result<Option<Interaction>, AppError>;
    async fn insert_interaction(&mut self, fields: &InteractionFields) -> Result<Interaction, AppError>;
    async fn get_interaction(&mut self, id: i64) -> Result<Option<Interaction>, AppError>;
    async fn update_interaction(&mut self, id: i64, fields: &InteractionFields) -> Result<Option<Interaction>, AppError>;
    async fn delete_interaction(&mut self, id: i64) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_formats() {
        assert_eq!(Sequence::Medicine.format(1), "MED-1001");
        assert_eq!(Sequence::Supplier.format(12), "SUP-1012");
        assert_eq!(Sequence::Customer.format(7), "CUS-0007");
        assert_eq!(Sequence::Invoice.format(42), "INV-00042");
        assert_eq!(Sequence::Import.format(3), "IMP-000003");
    }

    #[test]
    fn each_sequence_has_its_own_lock() {
        let all = [Sequence::Medicine, Sequence::Customer, Sequence::Supplier, Sequence::Invoice, Sequence::Import];
        let mut keys: Vec<i64> = all.iter().map(Sequence::lock_key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), all.len());
    }
}
