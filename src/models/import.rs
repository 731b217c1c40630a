use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    pub id: i64,
    pub code: String,
    pub supplier_id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub status: String,
    pub total: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImportItem {
    pub id: i64,
    pub import_id: i64,
    pub medicine_id: i64,
    pub lot_number: String,
    pub expiry_date: NaiveDate,
    pub price: f64,
    pub quantity: i32,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct NewImport {
    pub code: String,
    pub supplier_id: i64,
    pub user_id: i64,
    pub status: String,
    pub total: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewImportItem {
    pub medicine_id: i64,
    pub lot_number: String,
    pub expiry_date: NaiveDate,
    pub price: f64,
    pub quantity: i32,
    pub total: f64,
}
