//! Registry entry contracts
//!
//! Field-level rules come from the `Validate` derives on the models; these
//! contracts add the rate and cross-field checks.

use std::sync::LazyLock;

use cb_core::error::ValidationErrors;
use cb_models::{AcquisitionType, Contractor, Employee, Equipment, Subcontractor};
use regex::Regex;
use validator::Validate;

use crate::base::{
    validate_digits, validate_non_negative, Contract, ValidationResult, PERCENT_DIGITS, RATE_DIGITS,
};

/// Taxpayer number: 10 digits for companies, 12 for individuals
static INN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{10}|\d{12})$").expect("valid INN pattern"));

fn derive_errors<T: Validate>(entity: &T) -> ValidationErrors {
    match entity.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(e) => e.into(),
    }
}

pub struct EmployeeContract;

impl Contract<Employee> for EmployeeContract {
    fn validate(&self, entity: &Employee) -> ValidationResult {
        let mut errors = derive_errors(entity);
        validate_non_negative("hourly_rate", entity.hourly_rate, &mut errors);
        validate_digits("hourly_rate", entity.hourly_rate, RATE_DIGITS, &mut errors);
        errors.into_result()
    }
}

pub struct ContractorContract;

impl Contract<Contractor> for ContractorContract {
    fn validate(&self, entity: &Contractor) -> ValidationResult {
        let mut errors = derive_errors(entity);
        validate_non_negative("hourly_rate", entity.hourly_rate, &mut errors);
        validate_digits("hourly_rate", entity.hourly_rate, RATE_DIGITS, &mut errors);
        validate_non_negative("tax_rate", entity.tax_rate, &mut errors);
        validate_digits("tax_rate", entity.tax_rate, PERCENT_DIGITS, &mut errors);
        errors.into_result()
    }
}

pub struct SubcontractorContract;

impl Contract<Subcontractor> for SubcontractorContract {
    fn validate(&self, entity: &Subcontractor) -> ValidationResult {
        let mut errors = derive_errors(entity);
        if !INN_PATTERN.is_match(&entity.inn) && !errors.has_error("inn") {
            errors.add("inn", "must be 10 or 12 digits");
        }
        validate_non_negative("daily_rate", entity.daily_rate, &mut errors);
        validate_digits("daily_rate", entity.daily_rate, RATE_DIGITS, &mut errors);
        errors.into_result()
    }
}

pub struct EquipmentContract;

impl EquipmentContract {
    /// Rented equipment must carry its running cost, and may not be
    /// billed below it
    fn validate_rental(entity: &Equipment, errors: &mut ValidationErrors) {
        if entity.acquisition_type != AcquisitionType::Rent {
            return;
        }
        match entity.operational_cost {
            None => errors.add("operational_cost", "is required for rented equipment"),
            Some(cost) if entity.service_cost_per_unit < cost => errors.add(
                "service_cost_per_unit",
                "must not be lower than the operational cost",
            ),
            Some(_) => {}
        }
    }
}

impl Contract<Equipment> for EquipmentContract {
    fn validate(&self, entity: &Equipment) -> ValidationResult {
        let mut errors = derive_errors(entity);
        validate_non_negative("service_cost_per_unit", entity.service_cost_per_unit, &mut errors);
        validate_digits("service_cost_per_unit", entity.service_cost_per_unit, RATE_DIGITS, &mut errors);
        if let Some(cost) = entity.operational_cost {
            validate_non_negative("operational_cost", cost, &mut errors);
            validate_digits("operational_cost", cost, RATE_DIGITS, &mut errors);
        }
        Self::validate_rental(entity, &mut errors);
        errors.into_result()
    }
}
