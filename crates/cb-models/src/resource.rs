//! Project resource model
//!
//! Table: project_resources
//!
//! An allocation of one registry entry (employee, contractor, subcontractor
//! or equipment) to a project, with a quantity and a margin percentage.

use chrono::{DateTime, NaiveDate, Utc};
use cb_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::registry::{ResourceKind, ResourceRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProjectResource {
    pub id: Option<Id>,

    pub project_id: Id,

    /// Declared kind; the reference must point into the same registry
    pub kind: ResourceKind,

    #[serde(default)]
    pub reference: ResourceRef,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub name: String,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub service_name: String,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Units of the registry rate (hours, days, units)
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,

    /// Markup percentage
    #[serde(default)]
    pub margin: Decimal,

    /// rate × quantity
    #[serde(default)]
    pub cost_price: Decimal,

    /// cost_price with margin applied
    #[serde(default)]
    pub final_cost: Decimal,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

impl ProjectResource {
    pub fn new(project_id: Id, kind: ResourceKind, reference: ResourceRef) -> Self {
        Self {
            id: None,
            project_id,
            kind,
            reference,
            name: String::new(),
            service_name: String::new(),
            start_date: None,
            end_date: None,
            quantity: Decimal::ONE,
            margin: Decimal::ZERO,
            cost_price: Decimal::ZERO,
            final_cost: Decimal::ZERO,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_margin(mut self, margin: Decimal) -> Self {
        self.margin = margin;
        self
    }

    /// Reference to price from, if it agrees with the declared kind
    pub fn priced_reference(&self) -> Option<ResourceRef> {
        match self.reference.kind() {
            Some(kind) if kind == self.kind => Some(self.reference),
            _ => None,
        }
    }

    /// Set when the reference points into a different registry than `kind`
    pub fn has_mismatched_reference(&self) -> bool {
        matches!(self.reference.kind(), Some(kind) if kind != self.kind)
    }

    /// Fill blank name fields from a registry display name
    pub fn autofill_names(&mut self, display_name: &str) {
        if self.name.trim().is_empty() {
            self.name = display_name.to_string();
        }
        if self.service_name.trim().is_empty() {
            self.service_name = format!("Services: {}", display_name);
        }
    }
}

impl Identifiable for ProjectResource {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for ProjectResource {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl ProjectScoped for ProjectResource {
    fn project_id(&self) -> Option<Id> {
        Some(self.project_id)
    }
}

impl Entity for ProjectResource {
    const TABLE_NAME: &'static str = "project_resources";
    const TYPE_NAME: &'static str = "ProjectResource";
}

/// DTO for attaching a resource to a project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachResourceDto {
    pub kind: ResourceKind,
    #[serde(default)]
    pub reference: ResourceRef,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub service_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub quantity: Option<Decimal>,
    pub margin: Option<Decimal>,
}

impl AttachResourceDto {
    pub fn new(kind: ResourceKind, reference: ResourceRef) -> Self {
        Self {
            kind,
            reference,
            name: None,
            service_name: None,
            start_date: None,
            end_date: None,
            quantity: None,
            margin: None,
        }
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn margin(mut self, margin: Decimal) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Build an unsaved resource row for `project_id`
    pub fn into_resource(self, project_id: Id) -> ProjectResource {
        let mut resource = ProjectResource::new(project_id, self.kind, self.reference);
        resource.name = self.name.unwrap_or_default();
        resource.service_name = self.service_name.unwrap_or_default();
        resource.start_date = self.start_date;
        resource.end_date = self.end_date;
        if let Some(quantity) = self.quantity {
            resource.quantity = quantity;
        }
        if let Some(margin) = self.margin {
            resource.margin = margin;
        }
        resource
    }
}

/// DTO for editing an attached resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateResourceDto {
    pub kind: Option<ResourceKind>,
    pub reference: Option<ResourceRef>,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub service_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub quantity: Option<Decimal>,
    pub margin: Option<Decimal>,
}

impl UpdateResourceDto {
    pub fn apply_to(&self, resource: &mut ProjectResource) {
        if let Some(kind) = self.kind {
            resource.kind = kind;
        }
        if let Some(reference) = self.reference {
            resource.reference = reference;
        }
        if let Some(name) = &self.name {
            resource.name = name.clone();
        }
        if let Some(service_name) = &self.service_name {
            resource.service_name = service_name.clone();
        }
        if let Some(start_date) = self.start_date {
            resource.start_date = Some(start_date);
        }
        if let Some(end_date) = self.end_date {
            resource.end_date = Some(end_date);
        }
        if let Some(quantity) = self.quantity {
            resource.quantity = quantity;
        }
        if let Some(margin) = self.margin {
            resource.margin = margin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let r = ProjectResource::new(1, ResourceKind::Employee, ResourceRef::Employee(2));
        assert_eq!(r.quantity, Decimal::ONE);
        assert_eq!(r.margin, Decimal::ZERO);
        assert_eq!(r.project_id(), Some(1));
    }

    #[test]
    fn test_priced_reference_requires_matching_kind() {
        let ok = ProjectResource::new(1, ResourceKind::Equipment, ResourceRef::Equipment(3));
        assert_eq!(ok.priced_reference(), Some(ResourceRef::Equipment(3)));

        let missing = ProjectResource::new(1, ResourceKind::Equipment, ResourceRef::None);
        assert_eq!(missing.priced_reference(), None);
        assert!(!missing.has_mismatched_reference());

        let wrong = ProjectResource::new(1, ResourceKind::Equipment, ResourceRef::Employee(3));
        assert_eq!(wrong.priced_reference(), None);
        assert!(wrong.has_mismatched_reference());
    }

    #[test]
    fn test_autofill_only_blank_names() {
        let mut r = ProjectResource::new(1, ResourceKind::Employee, ResourceRef::Employee(2));
        r.autofill_names("Ivanov Ivan");
        assert_eq!(r.name, "Ivanov Ivan");
        assert_eq!(r.service_name, "Services: Ivanov Ivan");

        r.name = "Lead engineer".into();
        r.autofill_names("Petrov Petr");
        assert_eq!(r.name, "Lead engineer");
    }

    #[test]
    fn test_attach_dto_into_resource() {
        let r = AttachResourceDto::new(ResourceKind::Contractor, ResourceRef::Contractor(5))
            .quantity(Decimal::from(8))
            .into_resource(4);
        assert_eq!(r.project_id, 4);
        assert_eq!(r.quantity, Decimal::from(8));
        assert_eq!(r.margin, Decimal::ZERO);
        assert!(r.is_new_record());
    }

    #[test]
    fn test_update_dto_apply() {
        let mut r = ProjectResource::new(1, ResourceKind::Employee, ResourceRef::Employee(2));
        UpdateResourceDto {
            margin: Some(Decimal::from(15)),
            ..Default::default()
        }
        .apply_to(&mut r);
        assert_eq!(r.margin, Decimal::from(15));
        assert_eq!(r.quantity, Decimal::ONE);
    }
}
