//! Base contract system

use chrono::NaiveDate;
use rust_decimal::Decimal;

pub use cb_core::error::ValidationErrors;
pub use cb_core::result::ValidationResult;
pub use cb_core::traits::UserContext;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;

    /// Check if an attribute is writable
    fn is_writable(&self, _attribute: &str) -> bool {
        true
    }
}

/// Attributes maintained by the roll-up engine
pub const COMPUTED_ATTRIBUTES: &[&str] = &[
    "cost_price",
    "final_cost",
    "cost_with_margin",
    "net_profit",
    "total_cost",
];

pub fn is_computed(attribute: &str) -> bool {
    COMPUTED_ATTRIBUTES.contains(&attribute)
}

pub fn validate_non_negative(field: &str, value: Decimal, errors: &mut ValidationErrors) {
    if value.is_sign_negative() && !value.is_zero() {
        errors.add(field, "must be greater than or equal to 0");
    }
}

/// Precision of a stored decimal column: at most `max_digits` digits in
/// total, `decimal_places` of them after the point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalDigits {
    pub max_digits: u32,
    pub decimal_places: u32,
}

impl DecimalDigits {
    pub const fn new(max_digits: u32, decimal_places: u32) -> Self {
        Self {
            max_digits,
            decimal_places,
        }
    }

    /// Smallest magnitude that no longer fits
    pub fn limit(&self) -> Decimal {
        let whole_digits = self.max_digits.saturating_sub(self.decimal_places).min(28);
        Decimal::from_i128_with_scale(10i128.pow(whole_digits), 0)
    }
}

/// Quantities: up to 99 999 999.99
pub const QUANTITY_DIGITS: DecimalDigits = DecimalDigits::new(10, 2);
/// Rates and unit costs: up to 99 999 999.99
pub const RATE_DIGITS: DecimalDigits = DecimalDigits::new(10, 2);
/// Margins and tax rates: up to 999.99
pub const PERCENT_DIGITS: DecimalDigits = DecimalDigits::new(5, 2);

pub fn validate_digits(field: &str, value: Decimal, digits: DecimalDigits, errors: &mut ValidationErrors) {
    if value.normalize().scale() > digits.decimal_places {
        errors.add(
            field,
            format!("must have at most {} decimal places", digits.decimal_places),
        );
    }
    let limit = digits.limit();
    if value.abs() >= limit {
        errors.add(field, format!("must be less than {}", limit));
    }
}

pub fn validate_max_length(field: &str, value: &str, max: usize, errors: &mut ValidationErrors) {
    if value.chars().count() > max {
        errors.add(field, format!("is too long (maximum is {} characters)", max));
    }
}

pub fn validate_present(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(field, "can't be blank");
    }
}

/// End date, when both are set, may not precede the start date
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    errors: &mut ValidationErrors,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add("end_date", "must be on or after the start date");
        }
    }
}

/// Owner-or-admin check shared by every write contract
pub fn validate_may_manage<U: UserContext>(
    user: &U,
    owner_id: cb_core::traits::Id,
    message: &str,
    errors: &mut ValidationErrors,
) {
    if !user.may_manage(owner_id) {
        errors.add("base", message);
    }
}
