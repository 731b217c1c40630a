use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{fetch_page, push_page, push_search, search_pattern};
use crate::dtos::inventory::{InventoryListQuery, LogEntry, LogListQuery, StockLevel, LOW_STOCK_MAX, MEDIUM_STOCK_MAX};
use crate::dtos::non_blank;
use crate::dtos::pagination::Page;
use crate::error::AppError;
use crate::models::medicine::Medicine;

fn stock_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &InventoryListQuery) {
    qb.push(" WHERE 1=1");
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(qb, &["m.name", "m.code"], &pattern);
    }
    if let Some(category) = non_blank(&q.category) {
        qb.push(" AND m.category = ").push_bind(category);
    }
    match q.stock {
        StockLevel::All => {}
        StockLevel::Low => {
            qb.push(" AND m.stock <= ").push_bind(LOW_STOCK_MAX);
        }
        StockLevel::Medium => {
            qb.push(" AND m.stock > ")
                .push_bind(LOW_STOCK_MAX)
                .push(" AND m.stock <= ")
                .push_bind(MEDIUM_STOCK_MAX);
        }
        StockLevel::High => {
            qb.push(" AND m.stock > ").push_bind(MEDIUM_STOCK_MAX);
        }
    }
}

pub fn stock_select(q: &InventoryListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT m.* FROM medicines m");
    stock_filters(&mut qb, q);
    qb.push(" ORDER BY m.stock ASC, m.name ASC");
    push_page(&mut qb, q.pagination());
    qb
}

/// Current stock per medicine, lowest first.
pub async fn list_stock(pool: &PgPool, q: &InventoryListQuery) -> Result<Page<Medicine>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM medicines m");
    stock_filters(&mut count, q);
    fetch_page(pool, count, stock_select(q), q.pagination()).await
}

const LOG_FROM: &str = " FROM inventory_logs l \
    JOIN medicines m ON m.id = l.medicine_id \
    JOIN users u ON u.id = l.user_id \
    WHERE 1=1";

fn log_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &LogListQuery) {
    if let Some(pattern) = search_pattern(&q.search) {
        push_search(qb, &["m.name", "m.code", "l.reference"], &pattern);
    }
    if let Some(kind) = q.log_type {
        qb.push(" AND l.log_type = ").push_bind(kind);
    }
    if let Some(medicine_id) = q.medicine_id {
        qb.push(" AND l.medicine_id = ").push_bind(medicine_id);
    }
}

pub fn logs_select(q: &LogListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT l.id, l.medicine_id, m.code AS medicine_code, m.name AS medicine_name, \
         l.user_id, u.name AS user_name, l.log_type, l.quantity, l.reference, l.note, l.created_at",
    );
    qb.push(LOG_FROM);
    log_filters(&mut qb, q);
    qb.push(" ORDER BY l.created_at DESC, l.id DESC");
    push_page(&mut qb, q.pagination());
    qb
}

pub async fn list_logs(pool: &PgPool, q: &LogListQuery) -> Result<Page<LogEntry>, AppError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*)");
    count.push(LOG_FROM);
    log_filters(&mut count, q);
    fetch_page(pool, count, logs_select(q), q.pagination()).await
}
