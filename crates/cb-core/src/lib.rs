//! # cb-core
//!
//! Core types, traits, and utilities for Costbook.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type aliases
//! - Core traits (Entity, Identifiable, Timestamped)
//! - Money and percentage helpers over `rust_decimal`
//! - Configuration types

pub mod error;
pub mod result;
pub mod traits;
pub mod money;
pub mod config;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use money::*;
