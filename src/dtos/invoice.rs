use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{non_blank, require_amount, require_quantity};
use crate::dtos::pagination::Pagination;
use crate::error::AppError;
use crate::models::invoice::{Invoice, InvoiceChanges, InvoiceItem};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    /// Generated when absent.
    pub code: Option<String>,
    /// Absent for walk-in sales.
    pub customer_id: Option<i64>,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    /// Defaults to the sum of line totals.
    pub total: Option<f64>,
    pub note: Option<String>,
    pub items: Vec<InvoiceItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemRequest {
    pub medicine_id: i64,
    pub quantity: i32,
    /// Defaults to the medicine's retail price.
    pub price: Option<f64>,
    /// Defaults to quantity x price.
    pub total: Option<f64>,
}

impl CreateInvoiceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.items.is_empty() {
            return Err(AppError::validation("Invoice must contain at least one item"));
        }
        if matches!(&self.code, Some(c) if c.trim().is_empty()) {
            return Err(AppError::validation("Invoice code cannot be blank"));
        }
        if let Some(total) = self.total {
            require_amount(total, "Invoice total")?;
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            require_quantity(item.quantity, 1)?;
            if let Some(price) = item.price {
                require_amount(price, "Price")?;
            }
            if let Some(total) = item.total {
                require_amount(total, "Line total")?;
            }
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

/// Header-only edit. Lines are fixed once the invoice exists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
}

impl UpdateInvoiceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.payment_method.is_none() && self.status.is_none() && self.note.is_none() {
            return Err(AppError::validation("Nothing to update"));
        }
        if matches!(&self.payment_method, Some(p) if p.trim().is_empty()) {
            return Err(AppError::validation("Payment method cannot be blank"));
        }
        if matches!(&self.status, Some(s) if s.trim().is_empty()) {
            return Err(AppError::validation("Status cannot be blank"));
        }
        Ok(())
    }

    pub fn changes(&self) -> InvoiceChanges {
        InvoiceChanges {
            payment_method: non_blank(&self.payment_method),
            status: non_blank(&self.status),
            note: self.note.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl InvoiceListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// One row of the invoice listing.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub invoice: Invoice,
    pub customer_name: Option<String>,
    pub item_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer_name: Option<String>,
    pub items: Vec<InvoiceLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    #[serde(flatten)]
    pub item: InvoiceItem,
    pub medicine_code: String,
    pub medicine_name: String,
}
