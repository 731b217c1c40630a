use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require_amount, require_quantity, require_text};
use crate::dtos::pagination::Pagination;
use crate::error::AppError;
use crate::models::import::{Import, ImportItem};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateImportRequest {
    pub supplier_id: i64,
    pub note: Option<String>,
    pub items: Vec<ImportItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportItemRequest {
    pub medicine_id: i64,
    pub quantity: i32,
    pub price: f64,
    pub lot_number: String,
    pub expiry_date: NaiveDate,
    pub total: Option<f64>,
}

impl CreateImportRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.items.is_empty() {
            return Err(AppError::validation("Import must contain at least one item"));
        }
        let mut seen = HashSet::new();
        for item in &self.items {
            require_quantity(item.quantity, 1)?;
            require_amount(item.price, "Price")?;
            if let Some(total) = item.total {
                require_amount(total, "Line total")?;
            }
            require_text(&item.lot_number, "Lot number")?;
            if !seen.insert(item.medicine_id) {
                return Err(AppError::validation(format!(
                    "Medicine {} appears on more than one line",
                    item.medicine_id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ImportListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub import: Import,
    pub supplier_name: String,
    pub item_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDetail {
    #[serde(flatten)]
    pub import: Import,
    pub supplier_name: String,
    pub items: Vec<ImportLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLine {
    #[serde(flatten)]
    pub item: ImportItem,
    pub medicine_code: String,
    pub medicine_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lot_number_is_required() {
        let req: CreateImportRequest = serde_json::from_value(serde_json::json!({
            "supplierId": 1,
            "items": [{
                "medicineId": 3,
                "quantity": 10,
                "price": 1.2,
                "lotNumber": "",
                "expiryDate": "2027-01-31"
            }]
        }))
        .unwrap();
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }
}
