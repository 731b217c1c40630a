// src/ledger/memory.rs
//! In-process ledger used by tests and local tooling.
//!
//! One [`MemoryTx`] holds the store lock for its whole lifetime, so units of
//! work are serialized. Writes go to a private copy of the tables that is
//! published only on `commit()`.
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LedgerTx, Sequence, StockUpdate, STOCK_OUT_OF_RANGE};
use crate::error::AppError;
use crate::models::customer::{Customer, CustomerFields};
use crate::models::import::{Import, ImportItem, NewImport, NewImportItem};
use crate::models::interaction::{Interaction, InteractionFields};
use crate::models::inventory_log::{InventoryLog, NewInventoryLog};
use crate::models::invoice::{Invoice, InvoiceChanges, InvoiceItem, NewInvoice, NewInvoiceItem};
use crate::models::medicine::{Medicine, MedicineFields};
use crate::models::supplier::{Supplier, SupplierFields};

#[derive(Debug, Clone, Default)]
struct Tables {
    medicines: BTreeMap<i64, Medicine>,
    customers: BTreeMap<i64, Customer>,
    suppliers: BTreeMap<i64, Supplier>,
    invoices: BTreeMap<i64, Invoice>,
    invoice_items: BTreeMap<i64, InvoiceItem>,
    imports: BTreeMap<i64, Import>,
    import_items: BTreeMap<i64, ImportItem>,
    interactions: BTreeMap<i64, Interaction>,
    logs: Vec<InventoryLog>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn codes(&self, seq: Sequence) -> Vec<&str> {
        match seq {
            Sequence::Medicine => self.medicines.values().map(|m| m.code.as_str()).collect(),
            Sequence::Customer => self.customers.values().map(|c| c.code.as_str()).collect(),
            Sequence::Supplier => self.suppliers.values().map(|s| s.code.as_str()).collect(),
            Sequence::Invoice => self.invoices.values().map(|i| i.code.as_str()).collect(),
            Sequence::Import => self.imports.values().map(|i| i.code.as_str()).collect(),
        }
    }

    fn unique_code(&self, seq: Sequence, code: &str) -> Result<(), AppError> {
        if self.codes(seq).contains(&code) {
            return Err(AppError::conflict("Record already exists"));
        }
        Ok(())
    }

    fn medicine_exists(&self, id: i64) -> Result<(), AppError> {
        if self.medicines.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::validation("Referenced record does not exist"))
        }
    }
}

/// Shared in-memory store. Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a unit of work, waiting for any other open one to finish.
    pub async fn begin(&self) -> MemoryTx {
        let guard = self.tables.clone().lock_owned().await;
        let work = guard.clone();
        MemoryTx { guard, work }
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

impl MemoryTx {
    pub fn commit(mut self) {
        *self.guard = self.work;
    }
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn lock_sequence(&mut self, _seq: Sequence) -> Result<(), AppError> {
        Ok(())
    }

    async fn count_rows(&mut self, seq: Sequence) -> Result<i64, AppError> {
        Ok(self.work.codes(seq).len() as i64)
    }

    async fn code_taken(&mut self, seq: Sequence, code: &str) -> Result<bool, AppError> {
        Ok(self.work.codes(seq).contains(&code))
    }

    async fn insert_medicine(&mut self, code: &str, f: &MedicineFields) -> Result<Medicine, AppError> {
        self.work.unique_code(Sequence::Medicine, code)?;
        let now = Utc::now();
        let medicine = Medicine {
            id: self.work.next_id(),
            code: code.to_string(),
            name: f.name.clone(),
            description: f.description.clone(),
            category: f.category.clone(),
            active_ingredient: f.active_ingredient.clone(),
            dosage: f.dosage.clone(),
            indication: f.indication.clone(),
            contraindication: f.contraindication.clone(),
            side_effects: f.side_effects.clone(),
            storage: f.storage.clone(),
            manufacturer: f.manufacturer.clone(),
            import_price: f.import_price,
            retail_price: f.retail_price,
            stock: 0,
            expiry_date: f.expiry_date,
            lot_number: f.lot_number.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.medicines.insert(medicine.id, medicine.clone());
        Ok(medicine)
    }

    async fn get_medicine(&mut self, id: i64) -> Result<Option<Medicine>, AppError> {
        Ok(self.work.medicines.get(&id).cloned())
    }

    async fn lock_medicine(&mut self, id: i64) -> Result<Option<Medicine>, AppError> {
        // The whole store is already held by this unit of work.
        Ok(self.work.medicines.get(&id).cloned())
    }

    async fn find_medicines_by_name(&mut self, name: &str) -> Result<Vec<Medicine>, AppError> {
        Ok(self
            .work
            .medicines
            .values()
            .filter(|m| m.name == name)
            .cloned()
            .collect())
    }

    async fn update_medicine(&mut self, id: i64, f: &MedicineFields) -> Result<Option<Medicine>, AppError> {
        let Some(m) = self.work.medicines.get_mut(&id) else {
            return Ok(None);
        };
        m.name = f.name.clone();
        m.description = f.description.clone();
        m.category = f.category.clone();
        m.active_ingredient = f.active_ingredient.clone();
        m.dosage = f.dosage.clone();
        m.indication = f.indication.clone();
        m.contraindication = f.contraindication.clone();
        m.side_effects = f.side_effects.clone();
        m.storage = f.storage.clone();
        m.manufacturer = f.manufacturer.clone();
        m.import_price = f.import_price;
        m.retail_price = f.retail_price;
        m.expiry_date = f.expiry_date;
        m.lot_number = f.lot_number.clone();
        m.updated_at = Utc::now();
        Ok(Some(m.clone()))
    }

    async fn medicine_in_use(&mut self, id: i64) -> Result<bool, AppError> {
        Ok(self.work.invoice_items.values().any(|i| i.medicine_id == id)
            || self.work.import_items.values().any(|i| i.medicine_id == id))
    }

    async fn delete_medicine(&mut self, id: i64) -> Result<bool, AppError> {
        if self.work.logs.iter().any(|l| l.medicine_id == id) {
            return Err(AppError::validation("Referenced record does not exist"));
        }
        self.work
            .interactions
            .retain(|_, i| i.medicine_from_id != id && i.medicine_to_id != id);
        Ok(self.work.medicines.remove(&id).is_some())
    }

    async fn shift_stock(&mut self, id: i64, delta: i32) -> Result<StockUpdate, AppError> {
        let Some(m) = self.work.medicines.get_mut(&id) else {
            return Ok(StockUpdate::Missing);
        };
        match m.stock.checked_add(delta) {
            Some(next) if next >= 0 => {
                m.stock = next;
                m.updated_at = Utc::now();
                Ok(StockUpdate::Applied { stock: next })
            }
            Some(_) => Ok(StockUpdate::Insufficient { available: m.stock }),
            None => Err(AppError::validation(STOCK_OUT_OF_RANGE)),
        }
    }

    async fn set_lot(&mut self, id: i64, lot_number: &str, expiry_date: NaiveDate) -> Result<(), AppError> {
        if let Some(m) = self.work.medicines.get_mut(&id) {
            m.lot_number = Some(lot_number.to_string());
            m.expiry_date = Some(expiry_date);
            m.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_customer(&mut self, code: &str, f: &CustomerFields) -> Result<Customer, AppError> {
        self.work.unique_code(Sequence::Customer, code)?;
        let now = Utc::now();
        let customer = Customer {
            id: self.work.next_id(),
            code: code.to_string(),
            name: f.name.clone(),
            phone: f.phone.clone(),
            email: f.email.clone(),
            address: f.address.clone(),
            birthdate: f.birthdate,
            created_at: now,
            updated_at: now,
        };
        self.work.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_customer(&mut self, id: i64) -> Result<Option<Customer>, AppError> {
        Ok(self.work.customers.get(&id).cloned())
    }

    async fn update_customer(&mut self, id: i64, f: &CustomerFields) -> Result<Option<Customer>, AppError> {
        let Some(c) = self.work.customers.get_mut(&id) else {
            return Ok(None);
        };
        c.name = f.name.clone();
        c.phone = f.phone.clone();
        c.email = f.email.clone();
        c.address = f.address.clone();
        c.birthdate = f.birthdate;
        c.updated_at = Utc::now();
        Ok(Some(c.clone()))
    }

    async fn count_customer_invoices(&mut self, id: i64) -> Result<i64, AppError> {
        Ok(self
            .work
            .invoices
            .values()
            .filter(|i| i.customer_id == Some(id))
            .count() as i64)
    }

    async fn delete_customer(&mut self, id: i64) -> Result<bool, AppError> {
        if self.work.invoices.values().any(|i| i.customer_id == Some(id)) {
            return Err(AppError::validation("Referenced record does not exist"));
        }
        Ok(self.work.customers.remove(&id).is_some())
    }

    async fn insert_supplier(&mut self, code: &str, f: &SupplierFields) -> Result<Supplier, AppError> {
        self.work.unique_code(Sequence::Supplier, code)?;
        let now = Utc::now();
        let supplier = Supplier {
            id: self.work.next_id(),
            code: code.to_string(),
            name: f.name.clone(),
            phone: f.phone.clone(),
            email: f.email.clone(),
            address: f.address.clone(),
            contact_person: f.contact_person.clone(),
            tax_code: f.tax_code.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn get_supplier(&mut self, id: i64) -> Result<Option<Supplier>, AppError> {
        Ok(self.work.suppliers.get(&id).cloned())
    }

    async fn update_supplier(&mut self, id: i64, f: &SupplierFields) -> Result<Option<Supplier>, AppError> {
        let Some(s) = self.work.suppliers.get_mut(&id) else {
            return Ok(None);
        };
        s.name = f.name.clone();
        s.phone = f.phone.clone();
        s.email = f.email.clone();
        s.address = f.address.clone();
        s.contact_person = f.contact_person.clone();
        s.tax_code = f.tax_code.clone();
        s.updated_at = Utc::now();
        Ok(Some(s.clone()))
    }

    async fn count_supplier_imports(&mut self, id: i64) -> Result<i64, AppError> {
        Ok(self
            .work
            .imports
            .values()
            .filter(|i| i.supplier_id == id)
            .count() as i64)
    }

    async fn delete_supplier(&mut self, id: i64) -> Result<bool, AppError> {
        Ok(self.work.suppliers.remove(&id).is_some())
    }

    async fn insert_invoice(&mut self, inv: &NewInvoice) -> Result<Invoice, AppError> {
        if self.work.codes(Sequence::Invoice).contains(&inv.code.as_str()) {
            return Err(AppError::conflict(format!("Invoice code {} already exists", inv.code)));
        }
        if let Some(cid) = inv.customer_id {
            if !self.work.customers.contains_key(&cid) {
                return Err(AppError::validation("Referenced record does not exist"));
            }
        }
        let now = Utc::now();
        let invoice = Invoice {
            id: self.work.next_id(),
            code: inv.code.clone(),
            customer_id: inv.customer_id,
            user_id: inv.user_id,
            date: now,
            payment_method: inv.payment_method.clone(),
            status: inv.status.clone(),
            total: inv.total,
            note: inv.note.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn insert_invoice_item(&mut self, invoice_id: i64, item: &NewInvoiceItem) -> Result<InvoiceItem, AppError> {
        self.work.medicine_exists(item.medicine_id)?;
        let row = InvoiceItem {
            id: self.work.next_id(),
            invoice_id,
            medicine_id: item.medicine_id,
            quantity: item.quantity,
            price: item.price,
            total: item.total,
        };
        self.work.invoice_items.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_invoice(&mut self, id: i64) -> Result<Option<Invoice>, AppError> {
        Ok(self.work.invoices.get(&id).cloned())
    }

    async fn lock_invoice(&mut self, id: i64) -> Result<Option<Invoice>, AppError> {
        Ok(self.work.invoices.get(&id).cloned())
    }

    async fn invoice_items(&mut self, invoice_id: i64) -> Result<Vec<InvoiceItem>, AppError> {
        Ok(self
            .work
            .invoice_items
            .values()
            .filter(|i| i.invoice_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn update_invoice(&mut self, id: i64, changes: &InvoiceChanges) -> Result<Option<Invoice>, AppError> {
        let Some(inv) = self.work.invoices.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(pm) = &changes.payment_method {
            inv.payment_method = pm.clone();
        }
        if let Some(status) = &changes.status {
            inv.status = status.clone();
        }
        if let Some(note) = &changes.note {
            inv.note = Some(note.clone());
        }
        inv.updated_at = Utc::now();
        Ok(Some(inv.clone()))
    }

    async fn delete_invoice_items(&mut self, invoice_id: i64) -> Result<u64, AppError> {
        let before = self.work.invoice_items.len();
        self.work.invoice_items.retain(|_, i| i.invoice_id != invoice_id);
        Ok((before - self.work.invoice_items.len()) as u64)
    }

    async fn delete_invoice(&mut self, id: i64) -> Result<bool, AppError> {
        self.work.invoice_items.retain(|_, i| i.invoice_id != id);
        Ok(self.work.invoices.remove(&id).is_some())
    }

    async fn insert_import(&mut self, imp: &NewImport) -> Result<Import, AppError> {
        self.work.unique_code(Sequence::Import, &imp.code)?;
        if !self.work.suppliers.contains_key(&imp.supplier_id) {
            return Err(AppError::validation("Referenced record does not exist"));
        }
        let now = Utc::now();
        let import = Import {
            id: self.work.next_id(),
            code: imp.code.clone(),
            supplier_id: imp.supplier_id,
            user_id: imp.user_id,
            date: now,
            status: imp.status.clone(),
            total: imp.total,
            note: imp.note.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.imports.insert(import.id, import.clone());
        Ok(import)
    }

    async fn insert_import_item(&mut self, import_id: i64, item: &NewImportItem) -> Result<ImportItem, AppError> {
        self.work.medicine_exists(item.medicine_id)?;
        let row = ImportItem {
            id: self.work.next_id(),
            import_id,
            medicine_id: item.medicine_id,
            lot_number: item.lot_number.clone(),
            expiry_date: item.expiry_date,
            price: item.price,
            quantity: item.quantity,
            total: item.total,
        };
        self.work.import_items.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_import(&mut self, id: i64) -> Result<Option<Import>, AppError> {
        Ok(self.work.imports.get(&id).cloned())
    }

    async fn lock_import(&mut self, id: i64) -> Result<Option<Import>, AppError> {
        Ok(self.work.imports.get(&id).cloned())
    }

    async fn import_items(&mut self, import_id: i64) -> Result<Vec<ImportItem>, AppError> {
        Ok(self
            .work
            .import_items
            .values()
            .filter(|i| i.import_id == import_id)
            .cloned()
            .collect())
    }

    async fn delete_import_items(&mut self, import_id: i64) -> Result<u64, AppError> {
        let before = self.work.import_items.len();
        self.work.import_items.retain(|_, i| i.import_id != import_id);
        Ok((before - self.work.import_items.len()) as u64)
    }

    async fn delete_import(&mut self, id: i64) -> Result<bool, AppError> {
        self.work.import_items.retain(|_, i| i.import_id != id);
        Ok(self.work.imports.remove(&id).is_some())
    }

    async fn insert_log(&mut self, log: &NewInventoryLog) -> Result<InventoryLog, AppError> {
        self.work.medicine_exists(log.medicine_id)?;
        let row = InventoryLog {
            id: self.work.next_id(),
            medicine_id: log.medicine_id,
            user_id: log.user_id,
            log_type: log.log_type,
            quantity: log.quantity,
            reference: log.reference.clone(),
            note: log.note.clone(),
            created_at: Utc::now(),
        };
        self.work.logs.push(row.clone());
        Ok(row)
    }

    async fn medicine_logs(&mut self, medicine_id: i64) -> Result<Vec<InventoryLog>, AppError> {
        Ok(self
            .work
            .logs
            .iter()
            .filter(|l| l.medicine_id == medicine_id)
            .cloned()
            .collect())
    }

    async fn find_interaction_pair(&mut self, a: i64, b: i64, exclude: Option<i64>) -> Result<Option<Interaction>, AppError> {
        Ok(self
            .work
            .interactions
            .values()
            .find(|i| i.links(a, b) && Some(i.id) != exclude)
            .cloned())
    }

    async fn insert_interaction(&mut self, f: &InteractionFields) -> Result<Interaction, AppError> {
        if self
            .work
            .interactions
            .values()
            .any(|i| i.links(f.medicine_from_id, f.medicine_to_id))
        {
            return Err(AppError::conflict("Record already exists"));
        }
        self.work.medicine_exists(f.medicine_from_id)?;
        self.work.medicine_exists(f.medicine_to_id)?;
        let now = Utc::now();
        let row = Interaction {
            id: self.work.next_id(),
            medicine_from_id: f.medicine_from_id,
            medicine_to_id: f.medicine_to_id,
            severity: f.severity.clone(),
            description: f.description.clone(),
            recommendation: f.recommendation.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.interactions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_interaction(&mut self, id: i64) -> Result<Option<Interaction>, AppError> {
        Ok(self.work.interactions.get(&id).cloned())
    }

    async fn update_interaction(&mut self, id: i64, f: &InteractionFields) -> Result<Option<Interaction>, AppError> {
        if self
            .work
            .interactions
            .values()
            .any(|i| i.id != id && i.links(f.medicine_from_id, f.medicine_to_id))
        {
            return Err(AppError::conflict("Record already exists"));
        }
        let Some(row) = self.work.interactions.get_mut(&id) else {
            return Ok(None);
        };
        row.medicine_from_id = f.medicine_from_id;
        row.medicine_to_id = f.medicine_to_id;
        row.severity = f.severity.clone();
        row.description = f.description.clone();
        row.recommendation = f.recommendation.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_interaction(&mut self, id: i64) -> Result<bool, AppError> {
        Ok(self.work.interactions.remove(&id).is_some())
    }
}
