use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{fetch_page, push_page, push_search, search_pattern};
use crate::dtos::customer::CustomerListQuery;
use crate::dtos::medicine::MedicineListQuery;
use crate::dtos::non_blank;
use crate::dtos::pagination::{Page, Pagination};
use crate::dtos::supplier::SupplierListQuery;
use crate::error::AppError;
use crate::models::customer::Customer;
use crate::models::invoice::Invoice;
use crate::models::medicine::Medicine;
use crate::models::supplier::Supplier;

fn medicine_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &MedicineListQuery) {
    qb.push(" WHERE 1=1");
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(qb, &["m.name", "m.code"], &pattern);
    }
    if let Some(category) = non_blank(&q.category) {
        qb.push(" AND m.category = ").push_bind(category);
    }
}

pub fn medicines_select(q: &MedicineListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT m.* FROM medicines m");
    medicine_filters(&mut qb, q);
    qb.push(" ORDER BY m.created_at DESC, m.id DESC");
    push_page(&mut qb, q.pagination());
    qb
}

pub async fn list_medicines(pool: &PgPool, q: &MedicineListQuery) -> Result<Page<Medicine>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM medicines m");
    medicine_filters(&mut count, q);
    fetch_page(pool, count, medicines_select(q), q.pagination()).await
}

const CUSTOMER_SEARCH: [&str; 4] = ["c.name", "c.code", "c.phone", "c.email"];

pub fn customers_select(q: &CustomerListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT c.* FROM customers c WHERE 1=1");
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(&mut qb, &CUSTOMER_SEARCH, &pattern);
    }
    qb.push(" ORDER BY c.created_at DESC, c.id DESC");
    push_page(&mut qb, q.pagination());
    qb
}

pub async fn list_customers(pool: &PgPool, q: &CustomerListQuery) -> Result<Page<Customer>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM customers c WHERE 1=1");
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(&mut count, &CUSTOMER_SEARCH, &pattern);
    }
    fetch_page(pool, count, customers_select(q), q.pagination()).await
}

const SUPPLIER_SEARCH: [&str; 4] = ["s.name", "s.code", "s.phone", "s.contact_person"];

pub async fn list_suppliers(pool: &PgPool, q: &SupplierListQuery) -> Result<Page<Supplier>, AppError> {
    let pattern = search_pattern(&q.search);

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM suppliers s WHERE 1=1");
    let mut select = QueryBuilder::new("SELECT s.* FROM suppliers s WHERE 1=1");
    if let Some(pattern) = &pattern {
        push_search(&mut count, &SUPPLIER_SEARCH, pattern);
        push_search(&mut select, &SUPPLIER_SEARCH, pattern);
    }
    select.push(" ORDER BY s.created_at DESC, s.id DESC");
    push_page(&mut select, q.pagination());

    fetch_page(pool, count, select, q.pagination()).await
}

/// A customer's purchase history, newest first.
pub async fn customer_invoices(pool: &PgPool, customer_id: i64, p: Pagination) -> Result<Page<Invoice>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM invoices WHERE customer_id = ");
    count.push_bind(customer_id);

    let mut select = QueryBuilder::new("SELECT * FROM invoices WHERE customer_id = ");
    select.push_bind(customer_id).push(" ORDER BY date DESC, id DESC");
    push_page(&mut select, p);

    fetch_page(pool, count, select, p).await
}
