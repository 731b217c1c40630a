use serde::{Deserialize, Serialize};

use super::{non_blank, require_text};
use crate::dtos::pagination::Pagination;
use crate::error::AppError;
use crate::models::interaction::Interaction;

/// A medicine given by id, or by exact name as a convenience.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MedicineRef {
    Id(i64),
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub medicine1: MedicineRef,
    pub medicine2: MedicineRef,
    pub severity: String,
    pub description: String,
    pub recommendation: Option<String>,
}

impl InteractionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_ref(&self.medicine1)?;
        validate_ref(&self.medicine2)?;
        require_text(&self.severity, "Severity")?;
        require_text(&self.description, "Description")?;
        Ok(())
    }

    pub fn recommendation(&self) -> Option<String> {
        non_blank(&self.recommendation)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckInteractionRequest {
    pub medicine1: MedicineRef,
    pub medicine2: MedicineRef,
}

impl CheckInteractionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_ref(&self.medicine1)?;
        validate_ref(&self.medicine2)
    }
}

fn validate_ref(r: &MedicineRef) -> Result<(), AppError> {
    match r {
        MedicineRef::Name(name) if name.trim().is_empty() => {
            Err(AppError::validation("Both medicines are required"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InteractionDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub interaction: Interaction,
    pub medicine_from_name: String,
    pub medicine_to_name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckInteractionResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InteractionListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub severity: Option<String>,
}

impl InteractionListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}
