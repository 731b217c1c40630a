use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inventory_log_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryLogType {
    Import,             // Stock received from a supplier import
    Sale,               // Stock sold on an invoice
    Return,             // Stock restored when an invoice is deleted
    AdjustmentAdd,      // Manual correction upwards
    AdjustmentSubtract, // Manual correction downwards
    ImportCancel,       // Stock withdrawn when an import is deleted
    Initial,            // Opening balance when a medicine is created
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl InventoryLogType {
    pub const ALL: [InventoryLogType; 7] = [
        InventoryLogType::Import,
        InventoryLogType::Sale,
        InventoryLogType::Return,
        InventoryLogType::AdjustmentAdd,
        InventoryLogType::AdjustmentSubtract,
        InventoryLogType::ImportCancel,
        InventoryLogType::Initial,
    ];

    /// Which way this kind of movement is allowed to move stock.
    pub fn direction(&self) -> Direction {
        match self {
            InventoryLogType::Import
            | InventoryLogType::Return
            | InventoryLogType::AdjustmentAdd
            | InventoryLogType::Initial => Direction::Increase,
            InventoryLogType::Sale
            | InventoryLogType::AdjustmentSubtract
            | InventoryLogType::ImportCancel => Direction::Decrease,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryLogType::Import => "IMPORT",
            InventoryLogType::Sale => "SALE",
            InventoryLogType::Return => "RETURN",
            InventoryLogType::AdjustmentAdd => "ADJUSTMENT_ADD",
            InventoryLogType::AdjustmentSubtract => "ADJUSTMENT_SUBTRACT",
            InventoryLogType::ImportCancel => "IMPORT_CANCEL",
            InventoryLogType::Initial => "INITIAL",
        }
    }

    /// Human-readable label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            InventoryLogType::Import => "Stock import",
            InventoryLogType::Sale => "Sale",
            InventoryLogType::Return => "Return",
            InventoryLogType::AdjustmentAdd => "Adjustment (increase)",
            InventoryLogType::AdjustmentSubtract => "Adjustment (decrease)",
            InventoryLogType::ImportCancel => "Import cancelled",
            InventoryLogType::Initial => "Opening balance",
        }
    }
}

impl fmt::Display for InventoryLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryLogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InventoryLogType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown inventory log type '{s}'"))
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLog {
    pub id: i64,
    pub medicine_id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub log_type: InventoryLogType,
    pub quantity: i32,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInventoryLog {
    pub medicine_id: i64,
    pub user_id: i64,
    pub log_type: InventoryLogType,
    pub quantity: i32,
    pub reference: Option<String>,
    pub note: Option<String>,
}
