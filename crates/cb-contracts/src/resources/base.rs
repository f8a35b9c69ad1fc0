//! Base contract for project resources

use cb_core::error::ValidationErrors;
use cb_core::traits::Id;
use cb_models::{Project, ProjectResource, ResourceKind, ResourceRef};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::base::{
    validate_date_range, validate_digits, validate_max_length, validate_may_manage,
    validate_non_negative, Contract, UserContext, ValidationResult, PERCENT_DIGITS, QUANTITY_DIGITS,
};

pub const MAX_NAME_LENGTH: usize = 200;

/// Resource data for validation
pub trait ResourceData: Send + Sync {
    fn id(&self) -> Option<Id>;
    fn project_id(&self) -> Id;
    fn kind(&self) -> ResourceKind;
    fn reference(&self) -> ResourceRef;
    fn name(&self) -> &str;
    fn service_name(&self) -> &str;
    fn quantity(&self) -> Decimal;
    fn margin(&self) -> Decimal;
    fn start_date(&self) -> Option<NaiveDate>;
    fn end_date(&self) -> Option<NaiveDate>;
}

impl ResourceData for ProjectResource {
    fn id(&self) -> Option<Id> {
        self.id
    }
    fn project_id(&self) -> Id {
        self.project_id
    }
    fn kind(&self) -> ResourceKind {
        self.kind
    }
    fn reference(&self) -> ResourceRef {
        self.reference
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn service_name(&self) -> &str {
        &self.service_name
    }
    fn quantity(&self) -> Decimal {
        self.quantity
    }
    fn margin(&self) -> Decimal {
        self.margin
    }
    fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
    fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
}

/// Attribute rules common to attach and update
pub struct ResourceBaseContract;

impl ResourceBaseContract {
    /// A set reference must point into the registry named by `kind`.
    /// An unset reference is allowed and prices at zero.
    pub fn validate_reference(kind: ResourceKind, reference: ResourceRef, errors: &mut ValidationErrors) {
        if let Some(ref_kind) = reference.kind() {
            if ref_kind != kind {
                errors.add(
                    "reference",
                    format!("points to a {} but the resource is a {}", ref_kind, kind),
                );
            }
        }
    }

    /// Checks that `project` exists, contains the resource and is
    /// manageable by `user`
    pub fn validate_project_access<U: UserContext, T: ResourceData>(
        user: &U,
        project: &Project,
        entity: &T,
        errors: &mut ValidationErrors,
    ) {
        validate_may_manage(
            user,
            project.created_by,
            "You are not authorized to manage resources of this project",
            errors,
        );
        if project.id != Some(entity.project_id()) {
            errors.add("project", "does not match the resource's project");
        }
    }
}

impl<T: ResourceData> Contract<T> for ResourceBaseContract {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_max_length("name", entity.name(), MAX_NAME_LENGTH, &mut errors);
        validate_max_length("service_name", entity.service_name(), MAX_NAME_LENGTH, &mut errors);
        validate_non_negative("quantity", entity.quantity(), &mut errors);
        validate_digits("quantity", entity.quantity(), QUANTITY_DIGITS, &mut errors);
        validate_non_negative("margin", entity.margin(), &mut errors);
        validate_digits("margin", entity.margin(), PERCENT_DIGITS, &mut errors);
        Self::validate_reference(entity.kind(), entity.reference(), &mut errors);
        validate_date_range(entity.start_date(), entity.end_date(), &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        !crate::base::is_computed(attribute)
    }
}
