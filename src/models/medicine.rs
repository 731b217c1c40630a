use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub active_ingredient: Option<String>,
    pub dosage: Option<String>,
    pub indication: Option<String>,
    pub contraindication: Option<String>,
    pub side_effects: Option<String>,
    pub storage: Option<String>,
    pub manufacturer: Option<String>,
    pub import_price: f64,
    pub retail_price: f64,
    pub stock: i32,
    pub expiry_date: Option<NaiveDate>,
    pub lot_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything about a medicine except its code and stock. Stock only moves
/// through the stock mutation service.
#[derive(Debug, Clone, Default)]
pub struct MedicineFields {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub active_ingredient: Option<String>,
    pub dosage: Option<String>,
    pub indication: Option<String>,
    pub contraindication: Option<String>,
    pub side_effects: Option<String>,
    pub storage: Option<String>,
    pub manufacturer: Option<String>,
    pub import_price: f64,
    pub retail_price: f64,
    pub expiry_date: Option<NaiveDate>,
    pub lot_number: Option<String>,
}
