//! # cb-services
//!
//! Business operations for Costbook.
//!
//! Each service validates input with a contract, reprices the affected
//! project through the cost engine and commits the roll-up atomically.
//! Services return a [`ServiceResult`] carrying either the value or the
//! collected errors.

pub mod base;
pub mod projects;
pub mod resources;
pub mod result;

pub use base::{ResourceChange, ServiceContext};
pub use projects::{
    CreateProjectService, DeleteProjectService, RecomputeProjectService, UpdateProjectService,
};
pub use resources::{AttachResourceService, DetachResourceService, UpdateResourceService};
pub use result::ServiceResult;
