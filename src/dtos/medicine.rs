use chrono::NaiveDate;
use serde::Deserialize;

use super::{non_blank, require_amount, require_quantity, require_text};
use crate::dtos::pagination::Pagination;
use crate::error::AppError;
use crate::models::medicine::MedicineFields;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRequest {
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
    #[serde(default)]
    pub import_price: f64,
    #[serde(default)]
    pub retail_price: f64,
    /// Opening balance; only accepted on create.
    pub stock: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    pub lot_number: Option<String>,
}

impl MedicineRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.name, "Medicine name")?;
        require_text(&self.category, "Category")?;
        require_amount(self.import_price, "Import price")?;
        require_amount(self.retail_price, "Retail price")?;
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err(AppError::validation("Initial stock cannot be negative"));
            }
            require_quantity(stock, 0)?;
        }
        Ok(())
    }

    pub fn fields(&self) -> MedicineFields {
        MedicineFields {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            description: non_blank(&self.description),
            active_ingredient: non_blank(&self.active_ingredient),
            dosage: non_blank(&self.dosage),
            indication: non_blank(&self.indication),
            contraindication: non_blank(&self.contraindication),
            side_effects: non_blank(&self.side_effects),
            storage: non_blank(&self.storage),
            manufacturer: non_blank(&self.manufacturer),
            import_price: self.import_price,
            retail_price: self.retail_price,
            expiry_date: self.expiry_date,
            lot_number: non_blank(&self.lot_number),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicineListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl MedicineListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_camel_case_body() {
        let req: MedicineRequest = serde_json::from_value(serde_json::json!({
            "name": "Amoxicillin",
            "category": "Antibiotic",
            "activeIngredient": "amoxicillin trihydrate",
            "retailPrice": 2.5,
            "stock": 40,
            "expiryDate": "2027-03-01",
            "lotNumber": ""
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        let fields = req.fields();
        assert_eq!(fields.active_ingredient.as_deref(), Some("amoxicillin trihydrate"));
        assert_eq!(fields.import_price, 0.0);
        assert!(fields.lot_number.is_none());
        assert_eq!(req.stock, Some(40));
    }

    #[test]
    fn rejects_missing_name_and_negative_stock() {
        let mut req = MedicineRequest {
            name: " ".into(),
            category: "X".into(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        req.name = "Aspirin".into();
        req.stock = Some(-1);
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }
}
