use chrono::NaiveDate;
use serde::Deserialize;

use super::{non_blank, require_text};
use crate::dtos::pagination::Pagination;
use crate::error::AppError;
use crate::models::customer::CustomerFields;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

impl CustomerRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.name, "Customer name")?;
        if let Some(email) = non_blank(&self.email) {
            if !email.contains('@') {
                return Err(AppError::validation("Email address is not valid"));
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> CustomerFields {
        CustomerFields {
            name: self.name.trim().to_string(),
            phone: non_blank(&self.phone),
            email: non_blank(&self.email),
            address: non_blank(&self.address),
            birthdate: self.birthdate,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl CustomerListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}
