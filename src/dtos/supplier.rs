use serde::Deserialize;

use super::{non_blank, require_text};
use crate::dtos::pagination::Pagination;
use crate::error::AppError;
use crate::models::supplier::SupplierFields;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub contact_person: String,
    pub tax_code: Option<String>,
}

impl SupplierRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.name, "Supplier name")?;
        require_text(&self.phone, "Phone")?;
        require_text(&self.address, "Address")?;
        require_text(&self.contact_person, "Contact person")?;
        Ok(())
    }

    pub fn fields(&self) -> SupplierFields {
        SupplierFields {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: non_blank(&self.email),
            address: self.address.trim().to_string(),
            contact_person: self.contact_person.trim().to_string(),
            tax_code: non_blank(&self.tax_code),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SupplierListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl SupplierListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}
