//! Project model
//!
//! Table: projects

use chrono::{DateTime, NaiveDate, Utc};
use cb_core::traits::{Entity, Id, Identifiable, Timestamped};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tax rate applied when a project is created without one
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Project entity
///
/// Owns a collection of [`ProjectResource`](crate::ProjectResource) rows.
/// The four cost fields are computed by the roll-up engine and are never
/// written directly by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Project {
    pub id: Option<Id>,

    /// Display name
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    pub description: Option<String>,

    /// Customer the project is delivered to
    pub customer_id: Option<Id>,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Owning user
    pub created_by: Id,

    /// Tax percentage applied on top of the margin-inclusive cost
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,

    /// Σ resource cost price
    #[serde(default)]
    pub cost_price: Decimal,

    /// Σ resource final cost
    #[serde(default)]
    pub cost_with_margin: Decimal,

    /// cost_with_margin − cost_price
    #[serde(default)]
    pub net_profit: Decimal,

    /// cost_with_margin including tax
    #[serde(default)]
    pub total_cost: Decimal,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_tax_rate() -> Decimal {
    DEFAULT_TAX_RATE
}

impl Default for Project {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            customer_id: None,
            start_date: None,
            end_date: None,
            created_by: 0,
            tax_rate: DEFAULT_TAX_RATE,
            cost_price: Decimal::ZERO,
            cost_with_margin: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for Project {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

impl Project {
    /// Create a new project with minimal required fields
    pub fn new(name: impl Into<String>, created_by: Id) -> Self {
        Self {
            name: name.into(),
            created_by,
            ..Default::default()
        }
    }

    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Reset all computed totals to zero
    pub fn clear_totals(&mut self) {
        self.cost_price = Decimal::ZERO;
        self.cost_with_margin = Decimal::ZERO;
        self.net_profit = Decimal::ZERO;
        self.total_cost = Decimal::ZERO;
    }
}

/// DTO for creating a project
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateProjectDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<Id>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Falls back to the configured default when absent
    pub tax_rate: Option<Decimal>,
}

/// DTO for updating a project
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProjectDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub customer_id: Option<Id>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
}

impl UpdateProjectDto {
    /// Copy every present field onto `project`
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
        if let Some(customer_id) = self.customer_id {
            project.customer_id = Some(customer_id);
        }
        if let Some(start_date) = self.start_date {
            project.start_date = Some(start_date);
        }
        if let Some(end_date) = self.end_date {
            project.end_date = Some(end_date);
        }
        if let Some(tax_rate) = self.tax_rate {
            project.tax_rate = tax_rate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults() {
        let project = Project::new("Office fit-out", 7);
        assert_eq!(project.tax_rate, Decimal::from(20));
        assert_eq!(project.total_cost, Decimal::ZERO);
        assert_eq!(project.created_by, 7);
        assert!(project.is_new_record());
    }

    #[test]
    fn test_deserialize_applies_default_tax() {
        let project: Project = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Audit",
            "description": null,
            "customer_id": null,
            "start_date": null,
            "end_date": null,
            "created_by": 2,
            "created_at": null,
            "updated_at": null
        }))
        .unwrap();
        assert_eq!(project.tax_rate, DEFAULT_TAX_RATE);
        assert_eq!(project.cost_price, Decimal::ZERO);
    }

    #[test]
    fn test_update_dto_apply() {
        let mut project = Project::new("Audit", 2);
        let dto = UpdateProjectDto {
            name: Some("Audit 2026".into()),
            tax_rate: Some(Decimal::from(10)),
            ..Default::default()
        };
        dto.apply_to(&mut project);
        assert_eq!(project.name, "Audit 2026");
        assert_eq!(project.tax_rate, Decimal::from(10));
    }

    #[test]
    fn test_name_length_validation() {
        let dto = CreateProjectDto {
            name: String::new(),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
