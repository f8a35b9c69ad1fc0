//! Core error types for Costbook

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all Costbook operations
#[derive(Error, Debug)]
pub enum CbError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conflict: {message}")]
    Conflict { message: String },
}

impl CbError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CbError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    /// HTTP-style status code, for adapters that render errors
    pub fn status_code(&self) -> u16 {
        match self {
            CbError::NotFound { .. } => 404,
            CbError::Forbidden { .. } => 403,
            CbError::Validation(_) | CbError::Contract(_) => 422,
            CbError::Conflict { .. } => 409,
            CbError::Database(_) | CbError::Internal(_) | CbError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CbError::NotFound { .. } => "not_found",
            CbError::Forbidden { .. } => "forbidden",
            CbError::Validation(_) => "validation_failed",
            CbError::Contract(_) => "contract_violated",
            CbError::Database(_) => "database_error",
            CbError::Internal(_) => "internal_error",
            CbError::Config(_) => "configuration_error",
            CbError::Conflict { .. } => "conflict",
        }
    }
}

/// Validation errors collection, keyed by attribute name
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("Validation errors: {}", self.full_messages().join(", "))]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Field errors raised by `#[derive(Validate)]` DTOs
impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in source.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", error.code));
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

/// Contract validation error
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Attribute {attribute} is invalid: {message}")]
    AttributeInvalid { attribute: String, message: String },

    #[error("Attribute {attribute} is not writable")]
    AttributeNotWritable { attribute: String },

    #[error("Base contract error: {message}")]
    Base { message: String },
}

impl From<ContractError> for ValidationErrors {
    fn from(err: ContractError) -> Self {
        let mut errors = ValidationErrors::new();
        match err {
            ContractError::AttributeInvalid { attribute, message } => {
                errors.add(attribute, message);
            }
            ContractError::AttributeNotWritable { attribute } => {
                errors.add(attribute, "is not writable");
            }
            ContractError::Base { message } => {
                errors.add_base(message);
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_merge() {
        let mut a = ValidationErrors::new();
        a.add("quantity", "must be greater than or equal to 0");

        let mut b = ValidationErrors::new();
        b.add("quantity", "is not a number");
        b.add_base("Project is locked");

        a.merge(b);
        assert_eq!(a.get("quantity").map(Vec::len), Some(2));
        assert_eq!(a.base_errors, vec!["Project is locked".to_string()]);
    }

    #[test]
    fn test_full_messages_prefix_field() {
        let mut errors = ValidationErrors::new();
        errors.add("margin", "must be greater than or equal to 0");
        assert_eq!(
            errors.full_messages(),
            vec!["margin must be greater than or equal to 0".to_string()]
        );
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add_base("nope");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_contract_error_conversion() {
        let errors: ValidationErrors = ContractError::AttributeNotWritable {
            attribute: "cost_price".into(),
        }
        .into();
        assert!(errors.has_error("cost_price"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CbError::not_found("Project", 7).status_code(), 404);
        assert_eq!(
            CbError::Validation(ValidationErrors::new()).status_code(),
            422
        );
        assert_eq!(CbError::Database("down".into()).error_code(), "database_error");
    }
}
