//! Service result type

use cb_core::error::{CbError, ValidationErrors};
use std::fmt;

/// Outcome of a service call: a value on success, collected errors on failure
#[derive(Debug)]
pub struct ServiceResult<T> {
    success: bool,
    result: Option<T>,
    errors: ValidationErrors,
    message: Option<String>,
}

impl<T> ServiceResult<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            errors: ValidationErrors::new(),
            message: None,
        }
    }

    pub fn failure(errors: ValidationErrors) -> Self {
        Self {
            success: false,
            result: None,
            errors,
            message: None,
        }
    }

    /// Failure with a single attribute error
    pub fn failure_with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::failure(errors)
    }

    pub fn failure_with_base_error(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        Self::failure(errors)
    }

    /// Failure from a lower-layer error; validation errors keep their fields
    pub fn from_error(error: CbError) -> Self {
        match error {
            CbError::Validation(errors) => Self::failure(errors),
            CbError::Contract(err) => Self::failure(err.into()),
            other => Self::failure_with_base_error(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Convert into a plain `Result`
    pub fn into_result(self) -> Result<T, ValidationErrors> {
        match (self.success, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => {
                let mut errors = ValidationErrors::new();
                errors.add_base("Service succeeded but no result was returned");
                Err(errors)
            }
            (false, _) => Err(self.errors),
        }
    }

    /// Unwrap the result, panicking if it was a failure
    pub fn unwrap(self) -> T {
        match self.into_result() {
            Ok(result) => result,
            Err(errors) => panic!("called unwrap on a failed ServiceResult: {}", errors),
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.full_messages()
    }

    /// Map the result if successful
    pub fn map<U, F>(self, f: F) -> ServiceResult<U>
    where
        F: FnOnce(T) -> U,
    {
        ServiceResult {
            success: self.success,
            result: if self.success { self.result.map(f) } else { None },
            errors: self.errors,
            message: self.message,
        }
    }

    /// Chain with another service call if successful
    pub fn and_then<U, F>(self, f: F) -> ServiceResult<U>
    where
        F: FnOnce(T) -> ServiceResult<U>,
    {
        match self.into_result() {
            Ok(result) => f(result),
            Err(errors) => ServiceResult::failure(errors),
        }
    }
}

impl<T> From<Result<T, CbError>> for ServiceResult<T> {
    fn from(result: Result<T, CbError>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(error) => ServiceResult::from_error(error),
        }
    }
}

impl<T> From<Result<T, ValidationErrors>> for ServiceResult<T> {
    fn from(result: Result<T, ValidationErrors>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(errors) => ServiceResult::failure(errors),
        }
    }
}

impl<T: fmt::Display> fmt::Display for ServiceResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.result, self.success) {
            (Some(result), true) => write!(f, "Success: {}", result),
            (None, true) => write!(f, "Success"),
            (_, false) => write!(f, "Failure: {}", self.errors.full_messages().join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.result(), Some(&42));
        assert_eq!(result.to_string(), "Success: 42");
    }

    #[test]
    fn test_failure_result() {
        let result: ServiceResult<i32> = ServiceResult::failure_with_error("margin", "is invalid");
        assert!(result.is_failure());
        assert!(result.result().is_none());
        assert!(result.errors().has_error("margin"));
        assert_eq!(result.full_messages(), vec!["margin is invalid".to_string()]);
    }

    #[test]
    fn test_from_error_keeps_validation_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("quantity", "must be greater than or equal to 0");
        let result: ServiceResult<()> = ServiceResult::from_error(CbError::Validation(errors));
        assert!(result.errors().has_error("quantity"));

        let result: ServiceResult<()> = ServiceResult::from_error(CbError::not_found("Project", 9));
        assert_eq!(result.errors().base_errors.len(), 1);
    }

    #[test]
    fn test_map_and_chain() {
        let mapped = ServiceResult::success(21).map(|n| n * 2);
        assert_eq!(mapped.result(), Some(&42));

        let chained = mapped.and_then(|n| ServiceResult::success(n.to_string()));
        assert_eq!(chained.into_result().unwrap(), "42");

        let failed: ServiceResult<i32> = ServiceResult::failure_with_base_error("nope");
        assert!(failed.map(|n| n + 1).is_failure());
    }

    #[test]
    fn test_message() {
        let result = ServiceResult::success(()).with_message("Roll-up committed");
        assert_eq!(result.message(), Some("Roll-up committed"));
    }
}
