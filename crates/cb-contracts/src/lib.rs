//! # cb-contracts
//!
//! Contract validation for Costbook.
//!
//! Contracts validate entities before create/update/delete operations and
//! check that the acting user owns the project (or is an administrator).
//! The roll-up engine assumes its inputs passed these checks.

pub mod base;
pub mod nma;
pub mod projects;
pub mod registries;
pub mod resources;

pub use base::*;
