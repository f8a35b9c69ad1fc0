//! Project services
//!
//! Create, update, delete and recompute. Every write that can change totals
//! goes through [`crate::base::ServiceContext::rollup_and_commit`].

mod create;
mod delete;
mod recompute;
mod update;

pub use create::CreateProjectService;
pub use delete::DeleteProjectService;
pub use recompute::RecomputeProjectService;
pub use update::UpdateProjectService;
