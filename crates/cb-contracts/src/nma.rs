//! NMA cost sheet contracts

use cb_core::error::ValidationErrors;
use cb_models::{NmaCostSheet, NmaResourceItem};

use crate::base::{
    validate_digits, validate_non_negative, validate_present, Contract, ValidationResult,
    QUANTITY_DIGITS, RATE_DIGITS,
};

pub struct NmaItemContract;

impl Contract<NmaResourceItem> for NmaItemContract {
    fn validate(&self, entity: &NmaResourceItem) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_present("name", &entity.name, &mut errors);
        validate_present("unit", &entity.unit, &mut errors);
        validate_non_negative("quantity", entity.quantity, &mut errors);
        validate_digits("quantity", entity.quantity, QUANTITY_DIGITS, &mut errors);
        validate_non_negative("unit_cost", entity.unit_cost, &mut errors);
        validate_digits("unit_cost", entity.unit_cost, RATE_DIGITS, &mut errors);
        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        attribute != "total_cost"
    }
}

/// Validates the sheet header and every item, prefixing item errors with
/// their position (`items[0].quantity`)
pub struct NmaSheetContract;

impl Contract<NmaCostSheet> for NmaSheetContract {
    fn validate(&self, entity: &NmaCostSheet) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        validate_present("project_name", &entity.project_name, &mut errors);

        for (index, item) in entity.items.iter().enumerate() {
            if let Err(item_errors) = NmaItemContract.validate(item) {
                for (field, messages) in item_errors.errors {
                    for message in messages {
                        errors.add(format!("items[{}].{}", index, field), message);
                    }
                }
            }
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_valid_item() {
        let item = NmaResourceItem::new("Licence", Decimal::from(2), "pcs", Decimal::from(150));
        assert!(NmaItemContract.validate(&item).is_ok());
    }

    #[test]
    fn test_invalid_item() {
        let item = NmaResourceItem::new("", Decimal::from(-2), " ", Decimal::from(-1));
        let errors = NmaItemContract.validate(&item).unwrap_err();
        for field in ["name", "unit", "quantity", "unit_cost"] {
            assert!(errors.has_error(field), "expected error on {}", field);
        }
    }

    #[test]
    fn test_sheet_prefixes_item_errors() {
        let mut sheet = NmaCostSheet::new("CRM");
        sheet.items.push(NmaResourceItem::new("Ok", Decimal::ONE, "pcs", Decimal::ONE));
        sheet.items.push(NmaResourceItem::new("Bad", Decimal::from(-1), "pcs", Decimal::ONE));

        let errors = NmaSheetContract.validate(&sheet).unwrap_err();
        assert!(errors.has_error("items[1].quantity"));
        assert!(!errors.has_error("items[0].quantity"));
    }

    #[test]
    fn test_item_bounded_by_column_precision() {
        let item = NmaResourceItem::new("Servers", Decimal::MAX, "pcs", Decimal::new(1005, 3));
        let errors = NmaItemContract.validate(&item).unwrap_err();
        assert!(errors.has_error("quantity"));
        assert!(errors.has_error("unit_cost"));
    }
}
