use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{fetch_page, push_page, push_search, search_pattern};
use crate::dtos::import::{ImportListQuery, ImportSummary};
use crate::dtos::invoice::{InvoiceListQuery, InvoiceSummary};
use crate::dtos::pagination::Page;
use crate::error::AppError;

const INVOICE_FROM: &str = " FROM invoices i LEFT JOIN customers c ON c.id = i.customer_id WHERE 1=1";

fn invoice_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &InvoiceListQuery) {
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(qb, &["i.code", "c.name", "c.phone"], &pattern);
    }
    if let Some(start) = q.start_date {
        qb.push(" AND i.date >= ").push_bind(start);
    }
    if let Some(end) = q.end_date {
        // Inclusive of the whole end day.
        qb.push(" AND i.date < (").push_bind(end).push("::date + 1)");
    }
}

pub fn invoices_select(q: &InvoiceListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT i.*, c.name AS customer_name, \
         (SELECT COUNT(*) FROM invoice_items ii WHERE ii.invoice_id = i.id) AS item_count",
    );
    qb.push(INVOICE_FROM);
    invoice_filters(&mut qb, q);
    qb.push(" ORDER BY i.date DESC, i.id DESC");
    push_page(&mut qb, q.pagination());
    qb
}

pub async fn list_invoices(pool: &PgPool, q: &InvoiceListQuery) -> Result<Page<InvoiceSummary>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*)");
    count.push(INVOICE_FROM);
    invoice_filters(&mut count, q);
    fetch_page(pool, count, invoices_select(q), q.pagination()).await
}

const IMPORT_FROM: &str = " FROM imports i JOIN suppliers s ON s.id = i.supplier_id WHERE 1=1";

fn import_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &ImportListQuery) {
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(qb, &["i.code", "s.name"], &pattern);
    }
    if let Some(date) = q.date {
        qb.push(" AND i.date::date = ").push_bind(date);
    }
}

pub fn imports_select(q: &ImportListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT i.*, s.name AS supplier_name, \
         (SELECT COUNT(*) FROM import_items ii WHERE ii.import_id = i.id) AS item_count",
    );
    qb.push(IMPORT_FROM);
    import_filters(&mut qb, q);
    qb.push(" ORDER BY i.date DESC, i.id DESC");
    push_page(&mut qb, q.pagination());
    qb
}

pub async fn list_imports(pool: &PgPool, q: &ImportListQuery) -> Result<Page<ImportSummary>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*)");
    count.push(IMPORT_FROM);
    import_filters(&mut count, q);
    fetch_page(pool, count, imports_select(q), q.pagination()).await
}
