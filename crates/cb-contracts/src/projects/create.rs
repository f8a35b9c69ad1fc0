//! Create contract for projects

use cb_core::error::ValidationErrors;

use super::base::{ProjectBaseContract, ProjectData};
use crate::base::{is_computed, Contract, UserContext, ValidationResult};

/// Contract for creating a new project
///
/// Any user may create a project; it is owned by its creator.
pub struct CreateProjectContract<'a, U: UserContext> {
    base: ProjectBaseContract<'a, U>,
    user: &'a U,
}

impl<'a, U: UserContext> CreateProjectContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self {
            base: ProjectBaseContract::new(user),
            user,
        }
    }

    fn validate_owner(&self, owner_id: i64, errors: &mut ValidationErrors) {
        if owner_id != self.user.user_id() && !self.user.is_admin() {
            errors.add("created_by", "must be the creating user");
        }
    }
}

impl<'a, U: UserContext, T: ProjectData> Contract<T> for CreateProjectContract<'a, U> {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if entity.id().is_some() {
            errors.add_base("Project is already persisted");
        }
        self.validate_owner(entity.owner_id(), &mut errors);

        if let Err(base_errors) = self.base.validate(entity) {
            errors.merge(base_errors);
        }

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        !is_computed(attribute) && attribute != "id"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_core::traits::Actor;
    use cb_models::Project;

    #[test]
    fn test_create_own_project() {
        let user = Actor::user(4);
        let contract = CreateProjectContract::new(&user);
        assert!(contract.validate(&Project::new("Audit", 4)).is_ok());
    }

    #[test]
    fn test_cannot_create_for_someone_else() {
        let user = Actor::user(4);
        let contract = CreateProjectContract::new(&user);
        let errors = contract.validate(&Project::new("Audit", 5)).unwrap_err();
        assert!(errors.has_error("created_by"));
    }

    #[test]
    fn test_persisted_project_rejected() {
        let user = Actor::admin(1);
        let contract = CreateProjectContract::new(&user);
        let mut project = Project::new("Audit", 5);
        project.id = Some(10);
        assert!(!contract.validate(&project).unwrap_err().base_errors.is_empty());
    }

    #[test]
    fn test_totals_not_writable() {
        let user = Actor::user(1);
        let contract = CreateProjectContract::new(&user);
        assert!(!Contract::<Project>::is_writable(&contract, "total_cost"));
        assert!(Contract::<Project>::is_writable(&contract, "tax_rate"));
    }
}
