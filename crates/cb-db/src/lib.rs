//! # cb-db
//!
//! Persistence layer for Costbook.
//!
//! - Store traits (`ProjectStore`, `RegistryStore`) used by the services
//! - An in-memory store for tests and snapshot roll-ups
//! - PostgreSQL stores built on SQLx, with embedded migrations
//!
//! ## Example
//!
//! ```ignore
//! use cb_db::{Database, DatabaseConfig, PgProjectStore};
//!
//! let db = Database::connect(&DatabaseConfig::from_settings(&config.database)).await?;
//! db.migrate().await?;
//! let projects = PgProjectStore::new(db.pool().clone());
//! ```

pub mod memory;
pub mod pool;
pub mod projects;
pub mod registries;
pub mod repository;

pub use memory::MemoryStore;
pub use pool::{Database, DatabaseConfig};
pub use projects::PgProjectStore;
pub use registries::PgRegistryStore;
pub use repository::{
    CommittedRollup, ProjectStore, RegistryStore, RepositoryError, RepositoryResult,
    RollupChangeset,
};
