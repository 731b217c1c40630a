use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    pub code: String,
    pub customer_id: Option<i64>,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub payment_method: String,
    pub status: String,
    pub total: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub medicine_id: i64,
    pub quantity: i32,
    pub price: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub code: String,
    pub customer_id: Option<i64>,
    pub user_id: i64,
    pub payment_method: String,
    pub status: String,
    pub total: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInvoiceItem {
    pub medicine_id: i64,
    pub quantity: i32,
    pub price: f64,
    pub total: f64,
}

/// Header fields that may change after creation. Items never do.
#[derive(Debug, Clone, Default)]
pub struct InvoiceChanges {
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
}
