//! Result type aliases

use crate::error::{CbError, ValidationErrors};

/// Standard Result type for Costbook operations
pub type CbResult<T> = Result<T, CbError>;

/// Result of a contract or DTO validation
pub type ValidationResult = Result<(), ValidationErrors>;
