//! # cb-models
//!
//! Domain models for Costbook.
//!
//! Entity structs for projects, their resource allocations, the resource
//! registries and NMA cost sheets. Each model implements the core traits
//! from `cb-core` (Entity, Identifiable, etc.)

pub use cb_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};

pub mod nma;
pub mod project;
pub mod registry;
pub mod resource;

pub use nma::{NmaCostSheet, NmaResourceItem};
pub use project::{CreateProjectDto, Project, UpdateProjectDto, DEFAULT_TAX_RATE};
pub use registry::{
    AcquisitionType, ContractType, Contractor, Employee, Equipment, EquipmentUnit, RegistryEntry,
    ResourceKind, ResourceRef, Subcontractor,
};
pub use resource::{AttachResourceDto, ProjectResource, UpdateResourceDto};
