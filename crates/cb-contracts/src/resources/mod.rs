//! Project resource contracts

mod attach;
mod base;
mod detach;
mod update;

pub use attach::AttachResourceContract;
pub use base::{ResourceBaseContract, ResourceData, MAX_NAME_LENGTH};
pub use detach::DetachResourceContract;
pub use update::UpdateResourceContract;
