// src/ledger/postgres.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use super::{LedgerTx, Sequence, StockUpdate, STOCK_OUT_OF_RANGE};
use crate::error::AppError;
use crate::models::customer::{Customer, CustomerFields};
use crate::models::import::{Import, ImportItem, NewImport, NewImportItem};
use crate::models::interaction::{Interaction, InteractionFields};
use crate::models::inventory_log::{InventoryLog, NewInventoryLog};
use crate::models::invoice::{Invoice, InvoiceChanges, InvoiceItem, NewInvoice, NewInvoiceItem};
use crate::models::medicine::{Medicine, MedicineFields};
use crate::models::supplier::{Supplier, SupplierFields};

/// A Postgres transaction used as a ledger unit of work.
pub struct PgLedger {
    tx: Transaction<'static, Postgres>,
}

impl PgLedger {
    pub async fn begin(pool: &PgPool) -> Result<Self, AppError> {
        Ok(Self { tx: pool.begin().await? })
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerTx for PgLedger {
    async fn lock_sequence(&mut self, seq: Sequence) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(seq.lock_key())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn count_rows(&mut self, seq: Sequence) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {}", seq.table());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn code_taken(&mut self, seq: Sequence, code: &str) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE code = $1)", seq.table());
        let taken = sqlx::query_scalar::<_, bool>(&sql)
            .bind(code)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(taken)
    }

    // ---- medicines ----

    async fn insert_medicine(&mut self, code: &str, f: &MedicineFields) -> Result<Medicine, AppError> {
        sqlx::query_as::<_, Medicine>(
            r#"INSERT INTO medicines
                (code, name, description, category, active_ingredient, dosage, indication,
                 contraindication, side_effects, storage, manufacturer, import_price,
                 retail_price, stock, expiry_date, lot_number)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 0, $14, $15)
               RETURNING *"#,
        )
        .bind(code)
        .bind(&f.name)
        .bind(&f.description)
        .bind(&f.category)
        .bind(&f.active_ingredient)
        .bind(&f.dosage)
        .bind(&f.indication)
        .bind(&f.contraindication)
        .bind(&f.side_effects)
        .bind(&f.storage)
        .bind(&f.manufacturer)
        .bind(f.import_price)
        .bind(f.retail_price)
        .bind(f.expiry_date)
        .bind(&f.lot_number)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn get_medicine(&mut self, id: i64) -> Result<Option<Medicine>, AppError> {
        let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(medicine)
    }

    async fn lock_medicine(&mut self, id: i64) -> Result<Option<Medicine>, AppError> {
        let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(medicine)
    }

    async fn find_medicines_by_name(&mut self, name: &str) -> Result<Vec<Medicine>, AppError> {
        let medicines = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE name = $1 ORDER BY id")
            .bind(name)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(medicines)
    }

    async fn update_medicine(&mut self, id: i64, f: &MedicineFields) -> Result<Option<Medicine>, AppError> {
        sqlx::query_as::<_, Medicine>(
            r#"UPDATE medicines SET
                name = $2, description = $3, category = $4, active_ingredient = $5,
                dosage = $6, indication = $7, contraindication = $8, side_effects = $9,
                storage = $10, manufacturer = $11, import_price = $12, retail_price = $13,
                expiry_date = $14, lot_number = $15, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&f.name)
        .bind(&f.description)
        .bind(&f.category)
        .bind(&f.active_ingredient)
        .bind(&f.dosage)
        .bind(&f.indication)
        .bind(&f.contraindication)
        .bind(&f.side_effects)
        .bind(&f.storage)
        .bind(&f.manufacturer)
        .bind(f.import_price)
        .bind(f.retail_price)
        .bind(f.expiry_date)
        .bind(&f.lot_number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn medicine_in_use(&mut self, id: i64) -> Result<bool, AppError> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM invoice_items WHERE medicine_id = $1)
                   OR EXISTS(SELECT 1 FROM import_items WHERE medicine_id = $1)"#,
        )
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(in_use)
    }

    async fn delete_medicine(&mut self, id: i64) -> Result<bool, AppError> {
        sqlx::query("DELETE FROM interactions WHERE medicine_from_id = $1 OR medicine_to_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        let res = sqlx::query("DELETE FROM medicines WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(AppError::db)?;
        Ok(res.rows_affected() > 0)
    }

    async fn shift_stock(&mut self, id: i64, delta: i32) -> Result<StockUpdate, AppError> {
        // Check and write in one statement; the row lock taken by UPDATE
        // serializes concurrent sales of the same medicine.
        let applied = sqlx::query_scalar::<_, i32>(
            r#"UPDATE medicines
               SET stock = stock + $2, updated_at = NOW()
               WHERE id = $1 AND stock + $2 >= 0
               RETURNING stock"#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            // 22003: numeric_value_out_of_range
            if e.as_database_error().and_then(|d| d.code()).as_deref() == Some("22003") {
                AppError::validation(STOCK_OUT_OF_RANGE)
            } else {
                AppError::db(e)
            }
        })?;

        if let Some(stock) = applied {
            return Ok(StockUpdate::Applied { stock });
        }

        let current = sqlx::query_scalar::<_, i32>("SELECT stock FROM medicines WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(match current {
            Some(available) => StockUpdate::Insufficient { available },
            None => StockUpdate::Missing,
        })
    }

    async fn set_lot(&mut self, id: i64, lot_number: &str, expiry_date: NaiveDate) -> Result<(), AppError> {
        sqlx::query("UPDATE medicines SET lot_number = $2, expiry_date = $3, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(lot_number)
            .bind(expiry_date)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    // ---- customers ----

    async fn insert_customer(&mut self, code: &str, f: &CustomerFields) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"INSERT INTO customers (code, name, phone, email, address, birthdate)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(code)
        .bind(&f.name)
        .bind(&f.phone)
        .bind(&f.email)
        .bind(&f.address)
        .bind(f.birthdate)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn get_customer(&mut self, id: i64) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(customer)
    }

    async fn update_customer(&mut self, id: i64, f: &CustomerFields) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"UPDATE customers SET
                name = $2, phone = $3, email = $4, address = $5, birthdate = $6, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&f.name)
        .bind(&f.phone)
        .bind(&f.email)
        .bind(&f.address)
        .bind(f.birthdate)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn count_customer_invoices(&mut self, id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices WHERE customer_id = $1")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn delete_customer(&mut self, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(AppError::db)?;
        Ok(res.rows_affected() > 0)
    }

    // ---- suppliers ----

    async fn insert_supplier(&mut self, code: &str, f: &SupplierFields) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"INSERT INTO suppliers (code, name, phone, email, address, contact_person, tax_code)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(code)
        .bind(&f.name)
        .bind(&f.phone)
        .bind(&f.email)
        .bind(&f.address)
        .bind(&f.contact_person)
        .bind(&f.tax_code)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn get_supplier(&mut self, id: i64) -> Result<Option<Supplier>, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(supplier)
    }

    async fn update_supplier(&mut self, id: i64, f: &SupplierFields) -> Result<Option<Supplier>, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"UPDATE suppliers SET
                name = $2, phone = $3, email = $4, address = $5, contact_person = $6,
                tax_code = $7, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&f.name)
        .bind(&f.phone)
        .bind(&f.email)
        .bind(&f.address)
        .bind(&f.contact_person)
        .bind(&f.tax_code)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn count_supplier_imports(&mut self, id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM imports WHERE supplier_id = $1")
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count)
    }

    async fn delete_supplier(&mut self, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(AppError::db)?;
        Ok(res.rows_affected() > 0)
    }

    // ---- invoices ----

    async fn insert_invoice(&mut self, inv: &NewInvoice) -> Result<Invoice, AppError> {
        sqlx::query_as::<_, Invoice>(
            r#"INSERT INTO invoices (code, customer_id, user_id, payment_method, status, total, note)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(&inv.code)
        .bind(inv.customer_id)
        .bind(inv.user_id)
        .bind(&inv.payment_method)
        .bind(&inv.status)
        .bind(inv.total)
        .bind(&inv.note)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match AppError::db(e) {
            AppError::Conflict(_) => AppError::conflict(format!("Invoice code {} already exists", inv.code)),
            other => other,
        })
    }

    async fn insert_invoice_item(&mut self, invoice_id: i64, item: &NewInvoiceItem) -> Result<InvoiceItem, AppError> {
        sqlx::query_as::<_, InvoiceItem>(
            r#"INSERT INTO invoice_items (invoice_id, medicine_id, quantity, price, total)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(invoice_id)
        .bind(item.medicine_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.total)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn get_invoice(&mut self, id: i64) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(invoice)
    }

    async fn lock_invoice(&mut self, id: i64) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(invoice)
    }

    async fn invoice_items(&mut self, invoice_id: i64) -> Result<Vec<InvoiceItem>, AppError> {
        let items = sqlx::query_as::<_, InvoiceItem>("SELECT * FROM invoice_items WHERE invoice_id = $1 ORDER BY id")
            .bind(invoice_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(items)
    }

    async fn update_invoice(&mut self, id: i64, changes: &InvoiceChanges) -> Result<Option<Invoice>, AppError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"UPDATE invoices SET
                payment_method = COALESCE($2, payment_method),
                status = COALESCE($3, status),
                note = COALESCE($4, note),
                updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&changes.payment_method)
        .bind(&changes.status)
        .bind(&changes.note)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(invoice)
    }

    async fn delete_invoice_items(&mut self, invoice_id: i64) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(invoice_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(res.rows_affected())
    }

    async fn delete_invoice(&mut self, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // ---- imports ----

    async fn insert_import(&mut self, imp: &NewImport) -> Result<Import, AppError> {
        sqlx::query_as::<_, Import>(
            r#"INSERT INTO imports (code, supplier_id, user_id, status, total, note)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(&imp.code)
        .bind(imp.supplier_id)
        .bind(imp.user_id)
        .bind(&imp.status)
        .bind(imp.total)
        .bind(&imp.note)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn insert_import_item(&mut self, import_id: i64, item: &NewImportItem) -> Result<ImportItem, AppError> {
        sqlx::query_as::<_, ImportItem>(
            r#"INSERT INTO import_items (import_id, medicine_id, lot_number, expiry_date, price, quantity, total)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(import_id)
        .bind(item.medicine_id)
        .bind(&item.lot_number)
        .bind(item.expiry_date)
        .bind(item.price)
        .bind(item.quantity)
        .bind(item.total)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn get_import(&mut self, id: i64) -> Result<Option<Import>, AppError> {
        let import = sqlx::query_as::<_, Import>("SELECT * FROM imports WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(import)
    }

    async fn lock_import(&mut self, id: i64) -> Result<Option<Import>, AppError> {
        let import = sqlx::query_as::<_, Import>("SELECT * FROM imports WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(import)
    }

    async fn import_items(&mut self, import_id: i64) -> Result<Vec<ImportItem>, AppError> {
        let items = sqlx::query_as::<_, ImportItem>("SELECT * FROM import_items WHERE import_id = $1 ORDER BY id")
            .bind(import_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(items)
    }

    async fn delete_import_items(&mut self, import_id: i64) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM import_items WHERE import_id = $1")
            .bind(import_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(res.rows_affected())
    }

    async fn delete_import(&mut self, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM imports WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    // ---- inventory log ----

    async fn insert_log(&mut self, log: &NewInventoryLog) -> Result<InventoryLog, AppError> {
        sqlx::query_as::<_, InventoryLog>(
            r#"INSERT INTO inventory_logs (medicine_id, user_id, log_type, quantity, reference, note)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING *"#,
        )
        .bind(log.medicine_id)
        .bind(log.user_id)
        .bind(log.log_type)
        .bind(log.quantity)
        .bind(&log.reference)
        .bind(&log.note)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn medicine_logs(&mut self, medicine_id: i64) -> Result<Vec<InventoryLog>, AppError> {
        let logs = sqlx::query_as::<_, InventoryLog>(
            "SELECT * FROM inventory_logs WHERE medicine_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(medicine_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(logs)
    }

    // ---- interactions ----

    async fn find_interaction_pair(&mut self, a: i64, b: i64, exclude: Option<i64>) -> Result<Option<Interaction>, AppError> {
        let found = sqlx::query_as::<_, Interaction>(
            r#"SELECT * FROM interactions
               WHERE ((medicine_from_id = $1 AND medicine_to_id = $2)
                   OR (medicine_from_id = $2 AND medicine_to_id = $1))
                 AND ($3::BIGINT IS NULL OR id <> $3)
               LIMIT 1"#,
        )
        .bind(a)
        .bind(b)
        .bind(exclude)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(found)
    }

    async fn insert_interaction(&mut self, f: &InteractionFields) -> Result<Interaction, AppError> {
        sqlx::query_as::<_, Interaction>(
            r#"INSERT INTO interactions (medicine_from_id, medicine_to_id, severity, description, recommendation)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(f.medicine_from_id)
        .bind(f.medicine_to_id)
        .bind(&f.severity)
        .bind(&f.description)
        .bind(&f.recommendation)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn get_interaction(&mut self, id: i64) -> Result<Option<Interaction>, AppError> {
        let interaction = sqlx::query_as::<_, Interaction>("SELECT * FROM interactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(interaction)
    }

    async fn update_interaction(&mut self, id: i64, f: &InteractionFields) -> Result<Option<Interaction>, AppError> {
        sqlx::query_as::<_, Interaction>(
            r#"UPDATE interactions SET
                medicine_from_id = $2, medicine_to_id = $3, severity = $4,
                description = $5, recommendation = $6, updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(f.medicine_from_id)
        .bind(f.medicine_to_id)
        .bind(&f.severity)
        .bind(&f.description)
        .bind(&f.recommendation)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::db)
    }

    async fn delete_interaction(&mut self, id: i64) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM interactions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
