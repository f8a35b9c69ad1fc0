//! Project resource services
//!
//! Attaching, editing or detaching a resource re-rolls the whole project
//! and commits the result in one step.

mod attach;
mod detach;
mod update;

pub use attach::AttachResourceService;
pub use detach::DetachResourceService;
pub use update::UpdateResourceService;
