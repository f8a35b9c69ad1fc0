//! Project contracts

mod base;
mod create;
mod delete;
mod update;

pub use base::{ProjectBaseContract, ProjectData, MAX_NAME_LENGTH};
pub use create::CreateProjectContract;
pub use delete::DeleteProjectContract;
pub use update::UpdateProjectContract;
