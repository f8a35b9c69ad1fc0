//! Contract for editing an attached resource

use cb_core::error::ValidationErrors;
use cb_models::Project;

use super::base::{ResourceBaseContract, ResourceData};
use crate::base::{Contract, UserContext, ValidationResult};

pub struct UpdateResourceContract<'a, U: UserContext> {
    user: &'a U,
    project: &'a Project,
}

impl<'a, U: UserContext> UpdateResourceContract<'a, U> {
    pub fn new(user: &'a U, project: &'a Project) -> Self {
        Self { user, project }
    }
}

impl<'a, U: UserContext, T: ResourceData> Contract<T> for UpdateResourceContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if entity.id().is_none() {
            errors.add_base("Resource has not been attached");
        }
        ResourceBaseContract::validate_project_access(self.user, self.project, entity, &mut errors);

        if let Err(base_errors) = ResourceBaseContract.validate(entity) {
            errors.merge(base_errors);
        }

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        attribute != "project_id" && Contract::<T>::is_writable(&ResourceBaseContract, attribute)
    }
}
