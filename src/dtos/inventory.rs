use serde::{Deserialize, Serialize};

use super::require_quantity;
use crate::dtos::pagination::Pagination;
use crate::error::AppError;
use crate::models::inventory_log::{InventoryLog, InventoryLogType};
use crate::models::medicine::Medicine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustType {
    Add,
    Subtract,
    Set,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub medicine_id: i64,
    pub adjust_type: AdjustType,
    pub quantity: i32,
    pub reason: Option<String>,
}

impl AdjustStockRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        match self.adjust_type {
            AdjustType::Add | AdjustType::Subtract => require_quantity(self.quantity, 1),
            AdjustType::Set if self.quantity < 0 => {
                Err(AppError::validation("Target stock cannot be negative"))
            }
            AdjustType::Set => require_quantity(self.quantity, 0),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentResult {
    pub medicine: Medicine,
    pub delta: i32,
    /// `None` when a `set` lands on the current stock.
    pub log: Option<InventoryLog>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    #[default]
    All,
    Low,
    Medium,
    High,
}

pub const LOW_STOCK_MAX: i32 = 10;
pub const MEDIUM_STOCK_MAX: i32 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct InventoryListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub stock: StockLevel,
}

impl InventoryListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub log_type: Option<InventoryLogType>,
    pub medicine_id: Option<i64>,
}

impl LogListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// Log row joined with the names a listing needs.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub medicine_id: i64,
    pub medicine_code: String,
    pub medicine_name: String,
    pub user_id: i64,
    pub user_name: String,
    #[serde(rename = "type")]
    pub log_type: InventoryLogType,
    pub quantity: i32,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub log: InventoryLog,
    pub label: &'static str,
    pub balance: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineHistory {
    pub medicine_id: i64,
    pub code: String,
    pub name: String,
    pub stock: i32,
    pub logged_total: i64,
    /// True when stock equals the sum of every logged delta.
    pub consistent: bool,
    pub entries: Vec<HistoryEntry>,
}
