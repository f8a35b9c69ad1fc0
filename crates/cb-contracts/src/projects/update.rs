//! Update contract for projects

use cb_core::error::ValidationErrors;
use cb_core::traits::Id;

use super::base::{ProjectBaseContract, ProjectData};
use crate::base::{is_computed, validate_may_manage, Contract, UserContext, ValidationResult};

/// Contract for updating an existing project
pub struct UpdateProjectContract<'a, U: UserContext> {
    base: ProjectBaseContract<'a, U>,
    user: &'a U,
    /// Owner as stored, before the update was applied
    owner_id: Id,
}

impl<'a, U: UserContext> UpdateProjectContract<'a, U> {
    pub fn new(user: &'a U, owner_id: Id) -> Self {
        Self {
            base: ProjectBaseContract::new(user),
            user,
            owner_id,
        }
    }
}

impl<'a, U: UserContext, T: ProjectData> Contract<T> for UpdateProjectContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_may_manage(
            self.user,
            self.owner_id,
            "You are not authorized to edit this project",
            &mut errors,
        );
        if entity.owner_id() != self.owner_id {
            errors.add("created_by", "cannot be changed");
        }

        if let Err(base_errors) = self.base.validate(entity) {
            errors.merge(base_errors);
        }

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(
            attribute,
            "name" | "description" | "customer_id" | "start_date" | "end_date" | "tax_rate"
        ) && !is_computed(attribute)
    }
}
