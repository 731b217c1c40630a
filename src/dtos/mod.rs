pub mod auth;
pub mod customer;
pub mod import;
pub mod interaction;
pub mod inventory;
pub mod invoice;
pub mod medicine;
pub mod pagination;
pub mod supplier;

use crate::error::AppError;

/// Treats blank form input the same as an absent field.
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Largest quantity a single line, adjustment or opening balance may carry.
pub const MAX_QUANTITY: i32 = 1_000_000;

/// Accepts `min..=MAX_QUANTITY`.
pub(crate) fn require_quantity(value: i32, min: i32) -> Result<(), AppError> {
    if value < min {
        return Err(AppError::validation(if min > 0 {
            "Quantity must be greater than 0".to_string()
        } else {
            "Quantity cannot be negative".to_string()
        }));
    }
    if value > MAX_QUANTITY {
        return Err(AppError::validation(format!("Quantity cannot exceed {MAX_QUANTITY}")));
    }
    Ok(())
}

pub(crate) fn require_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!("{field} must be a non-negative number")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_are_bounded() {
        assert!(require_quantity(1, 1).is_ok());
        assert!(require_quantity(MAX_QUANTITY, 1).is_ok());
        assert!(require_quantity(0, 0).is_ok());
        assert!(matches!(require_quantity(0, 1), Err(AppError::ValidationError(_))));
        assert!(matches!(require_quantity(MAX_QUANTITY + 1, 1), Err(AppError::ValidationError(_))));
        assert!(matches!(require_quantity(i32::MAX, 0), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn blank_strings_become_none() {
        assert_eq!(non_blank(&Some("  ".into())), None);
        assert_eq!(non_blank(&Some(" 500mg ".into())), Some("500mg".into()));
        assert_eq!(non_blank(&None), None);
    }

    #[test]
    fn amounts_must_be_finite_and_non_negative() {
        assert!(require_amount(0.0, "price").is_ok());
        assert!(require_amount(-1.0, "price").is_err());
        assert!(require_amount(f64::NAN, "price").is_err());
    }
}
