//! Delete contract for projects

use cb_core::error::ValidationErrors;

use super::base::ProjectData;
use crate::base::{validate_may_manage, Contract, UserContext, ValidationResult};

/// Contract for deleting a project and, by cascade, its resources
pub struct DeleteProjectContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> DeleteProjectContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }
}

impl<'a, U: UserContext, T: ProjectData> Contract<T> for DeleteProjectContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if entity.id().is_none() {
            errors.add_base("Project has not been saved");
        }
        validate_may_manage(
            self.user,
            entity.owner_id(),
            "Only the project owner or an administrator can delete this project",
            &mut errors,
        );

        errors.into_result()
    }

    fn is_writable(&self, _attribute: &str) -> bool {
        false
    }
}
