//! Contract for removing a resource from a project

use cb_core::error::ValidationErrors;
use cb_models::Project;

use super::base::{ResourceBaseContract, ResourceData};
use crate::base::{Contract, UserContext, ValidationResult};

pub struct DetachResourceContract<'a, U: UserContext> {
    user: &'a U,
    project: &'a Project,
}

impl<'a, U: UserContext> DetachResourceContract<'a, U> {
    pub fn new(user: &'a U, project: &'a Project) -> Self {
        Self { user, project }
    }
}

impl<'a, U: UserContext, T: ResourceData> Contract<T> for DetachResourceContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        ResourceBaseContract::validate_project_access(self.user, self.project, entity, &mut errors);
        errors.into_result()
    }

    fn is_writable(&self, _attribute: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::traits::Actor;
    use cb_models::{ProjectResource, ResourceKind, ResourceRef};

    #[test]
    fn test_detach_permissions() {
        let mut p = Project::new("Fit-out", 1);
        p.id = Some(7);
        // Invalid attributes do not block removal
        let r = ProjectResource::new(7, ResourceKind::Equipment, ResourceRef::Employee(3));

        let owner = Actor::user(1);
        assert!(DetachResourceContract::new(&owner, &p).validate(&r).is_ok());

        let stranger = Actor::user(2);
        assert!(DetachResourceContract::new(&stranger, &p).validate(&r).is_err());
    }
}
