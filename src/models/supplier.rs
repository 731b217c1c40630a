use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub contact_person: String,
    pub tax_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierFields {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub contact_person: String,
    pub tax_code: Option<String>,
}
