//! Base contract for projects

use cb_core::error::ValidationErrors;
use cb_core::traits::Id;
use cb_models::Project;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::base::{
    validate_date_range, validate_digits, validate_max_length, validate_non_negative,
    validate_present, Contract, UserContext, ValidationResult, PERCENT_DIGITS,
};

pub const MAX_NAME_LENGTH: usize = 200;

/// Project data for validation
pub trait ProjectData: Send + Sync {
    fn id(&self) -> Option<Id>;
    fn name(&self) -> &str;
    fn tax_rate(&self) -> Decimal;
    fn start_date(&self) -> Option<NaiveDate>;
    fn end_date(&self) -> Option<NaiveDate>;
    fn owner_id(&self) -> Id;
}

impl ProjectData for Project {
    fn id(&self) -> Option<Id> {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
    fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
    fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
    fn owner_id(&self) -> Id {
        self.created_by
    }
}

/// Base contract for projects with common validations
pub struct ProjectBaseContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> ProjectBaseContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub fn validate_name(&self, name: &str, errors: &mut ValidationErrors) {
        validate_present("name", name, errors);
        validate_max_length("name", name, MAX_NAME_LENGTH, errors);
    }

    /// Tax is a percentage between 0 and 100
    pub fn validate_tax_rate(&self, tax_rate: Decimal, errors: &mut ValidationErrors) {
        validate_non_negative("tax_rate", tax_rate, errors);
        if tax_rate > Decimal::ONE_HUNDRED {
            errors.add("tax_rate", "must be less than or equal to 100");
        } else {
            validate_digits("tax_rate", tax_rate, PERCENT_DIGITS, errors);
        }
    }

    pub fn user(&self) -> &'a U {
        self.user
    }
}

impl<'a, U: UserContext, T: ProjectData> Contract<T> for ProjectBaseContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_name(entity.name(), &mut errors);
        self.validate_tax_rate(entity.tax_rate(), &mut errors);
        validate_date_range(entity.start_date(), entity.end_date(), &mut errors);

        errors.into_result()
    }
}
