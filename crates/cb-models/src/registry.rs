//! Resource registries
//!
//! Employees, contractors, subcontractors and equipment are priced by a
//! per-unit rate. A project resource points at exactly one registry entry
//! through [`ResourceRef`].

use std::fmt;

use cb_core::traits::{Entity, Id, Identifiable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kind of resource allocated to a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Employee,
    Contractor,
    Subcontractor,
    Equipment,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Employee,
        ResourceKind::Contractor,
        ResourceKind::Subcontractor,
        ResourceKind::Equipment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Contractor => "contractor",
            Self::Subcontractor => "subcontractor",
            Self::Equipment => "equipment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from a project resource to a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ResourceRef {
    Employee(Id),
    Contractor(Id),
    Subcontractor(Id),
    Equipment(Id),
    #[default]
    None,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, id: Id) -> Self {
        match kind {
            ResourceKind::Employee => Self::Employee(id),
            ResourceKind::Contractor => Self::Contractor(id),
            ResourceKind::Subcontractor => Self::Subcontractor(id),
            ResourceKind::Equipment => Self::Equipment(id),
        }
    }

    /// Kind of registry this reference points into
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Self::Employee(_) => Some(ResourceKind::Employee),
            Self::Contractor(_) => Some(ResourceKind::Contractor),
            Self::Subcontractor(_) => Some(ResourceKind::Subcontractor),
            Self::Equipment(_) => Some(ResourceKind::Equipment),
            Self::None => None,
        }
    }

    pub fn id(&self) -> Option<Id> {
        match *self {
            Self::Employee(id)
            | Self::Contractor(id)
            | Self::Subcontractor(id)
            | Self::Equipment(id) => Some(id),
            Self::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Build from the four nullable foreign-key columns of a stored row.
    ///
    /// Returns `None` (the Rust option) when more than one column is set.
    pub fn from_columns(
        employee_id: Option<Id>,
        contractor_id: Option<Id>,
        subcontractor_id: Option<Id>,
        equipment_id: Option<Id>,
    ) -> Option<Self> {
        let set: Vec<ResourceRef> = [
            employee_id.map(Self::Employee),
            contractor_id.map(Self::Contractor),
            subcontractor_id.map(Self::Subcontractor),
            equipment_id.map(Self::Equipment),
        ]
        .into_iter()
        .flatten()
        .collect();

        match set.as_slice() {
            [] => Some(Self::None),
            [single] => Some(*single),
            _ => None,
        }
    }

    /// Split into the four foreign-key columns (employee, contractor, subcontractor, equipment)
    pub fn to_columns(&self) -> (Option<Id>, Option<Id>, Option<Id>, Option<Id>) {
        match *self {
            Self::Employee(id) => (Some(id), None, None, None),
            Self::Contractor(id) => (None, Some(id), None, None),
            Self::Subcontractor(id) => (None, None, Some(id), None),
            Self::Equipment(id) => (None, None, None, Some(id)),
            Self::None => (None, None, None, None),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind(), self.id()) {
            (Some(kind), Some(id)) => write!(f, "{}#{}", kind, id),
            _ => f.write_str("none"),
        }
    }
}

/// Employee registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Employee {
    pub id: Option<Id>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    /// Cost of one hour of work
    pub hourly_rate: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Employee {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, hourly_rate: Decimal) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            middle_name: None,
            position: None,
            hourly_rate,
            is_active: true,
        }
    }

    /// "Last First Middle"
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.last_name.as_str(), self.first_name.as_str()];
        if let Some(middle) = self.middle_name.as_deref().filter(|m| !m.is_empty()) {
            parts.push(middle);
        }
        parts.join(" ")
    }
}

/// How a contractor is engaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    #[default]
    SelfEmployed,
    Individual,
    SoleProprietor,
}

/// Individual contractor registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Contractor {
    pub id: Option<Id>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub contract_type: ContractType,
    /// Tax withheld on the contractor's payments (percent)
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Cost of one hour of work
    pub hourly_rate: Decimal,
}

impl Contractor {
    pub fn new(last_name: impl Into<String>, first_name: impl Into<String>, hourly_rate: Decimal) -> Self {
        Self {
            id: None,
            last_name: last_name.into(),
            first_name: first_name.into(),
            middle_name: None,
            contract_type: ContractType::default(),
            tax_rate: Decimal::ZERO,
            hourly_rate,
        }
    }

    pub fn full_name(&self) -> String {
        let mut parts = vec![self.last_name.as_str(), self.first_name.as_str()];
        if let Some(middle) = self.middle_name.as_deref().filter(|m| !m.is_empty()) {
            parts.push(middle);
        }
        parts.join(" ")
    }
}

/// Subcontracting company registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Subcontractor {
    pub id: Option<Id>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Taxpayer identification number
    #[validate(length(min = 10, max = 12))]
    pub inn: String,
    #[serde(default)]
    pub director_name: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    /// Cost of one day of work
    pub daily_rate: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Subcontractor {
    pub fn new(name: impl Into<String>, inn: impl Into<String>, daily_rate: Decimal) -> Self {
        Self {
            id: None,
            name: name.into(),
            inn: inn.into(),
            director_name: None,
            email: None,
            daily_rate,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionType {
    #[default]
    Own,
    Rent,
}

/// Unit the equipment service cost is quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentUnit {
    #[default]
    Hours,
    Days,
    Full,
}

/// Equipment registry entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Equipment {
    pub id: Option<Id>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub acquisition_type: AcquisitionType,
    /// Running cost; required for rented equipment
    #[serde(default)]
    pub operational_cost: Option<Decimal>,
    #[serde(default)]
    pub unit: EquipmentUnit,
    /// Price of one unit of service
    pub service_cost_per_unit: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Equipment {
    pub fn new(name: impl Into<String>, service_cost_per_unit: Decimal) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            acquisition_type: AcquisitionType::Own,
            operational_cost: None,
            unit: EquipmentUnit::Hours,
            service_cost_per_unit,
            is_active: true,
        }
    }

    pub fn rented(mut self, operational_cost: Decimal) -> Self {
        self.acquisition_type = AcquisitionType::Rent;
        self.operational_cost = Some(operational_cost);
        self
    }
}

fn default_true() -> bool {
    true
}

macro_rules! registry_entity {
    ($ty:ty, $table:expr, $name:expr) => {
        impl Identifiable for $ty {
            fn id(&self) -> Option<Id> {
                self.id
            }
        }

        impl Entity for $ty {
            const TABLE_NAME: &'static str = $table;
            const TYPE_NAME: &'static str = $name;
        }
    };
}

registry_entity!(Employee, "employees", "Employee");
registry_entity!(Contractor, "contractors", "Contractor");
registry_entity!(Subcontractor, "subcontractors", "Subcontractor");
registry_entity!(Equipment, "equipment", "Equipment");

/// A resolved registry entry of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEntry {
    Employee(Employee),
    Contractor(Contractor),
    Subcontractor(Subcontractor),
    Equipment(Equipment),
}

impl RegistryEntry {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Employee(_) => ResourceKind::Employee,
            Self::Contractor(_) => ResourceKind::Contractor,
            Self::Subcontractor(_) => ResourceKind::Subcontractor,
            Self::Equipment(_) => ResourceKind::Equipment,
        }
    }

    /// Per-unit rate: hourly for people, daily for subcontractors,
    /// service cost per unit for equipment
    pub fn rate(&self) -> Decimal {
        match self {
            Self::Employee(e) => e.hourly_rate,
            Self::Contractor(c) => c.hourly_rate,
            Self::Subcontractor(s) => s.daily_rate,
            Self::Equipment(e) => e.service_cost_per_unit,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Employee(e) => e.full_name(),
            Self::Contractor(c) => c.full_name(),
            Self::Subcontractor(s) => s.name.clone(),
            Self::Equipment(e) => e.name.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Self::Employee(e) => e.is_active,
            Self::Contractor(_) => true,
            Self::Subcontractor(s) => s.is_active,
            Self::Equipment(e) => e.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_kind_and_id() {
        let r = ResourceRef::new(ResourceKind::Subcontractor, 4);
        assert_eq!(r, ResourceRef::Subcontractor(4));
        assert_eq!(r.kind(), Some(ResourceKind::Subcontractor));
        assert_eq!(r.id(), Some(4));
        assert_eq!(ResourceRef::None.kind(), None);
        assert!(ResourceRef::default().is_none());
    }

    #[test]
    fn test_ref_columns() {
        assert_eq!(
            ResourceRef::from_columns(None, None, Some(9), None),
            Some(ResourceRef::Subcontractor(9))
        );
        assert_eq!(ResourceRef::from_columns(None, None, None, None), Some(ResourceRef::None));
        assert_eq!(ResourceRef::from_columns(Some(1), Some(2), None, None), None);
        assert_eq!(ResourceRef::Equipment(5).to_columns(), (None, None, None, Some(5)));
    }

    #[test]
    fn test_ref_serde_shape() {
        let json = serde_json::to_value(ResourceRef::Employee(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "employee", "id": 3 }));

        let none: ResourceRef = serde_json::from_value(serde_json::json!({ "type": "none" })).unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(ResourceKind::parse("equipment"), Some(ResourceKind::Equipment));
        assert_eq!(ResourceKind::parse("robot"), None);
    }

    #[test]
    fn test_employee_full_name() {
        let mut e = Employee::new("Ivanov", "Ivan", Decimal::from(100));
        assert_eq!(e.full_name(), "Ivanov Ivan");
        e.middle_name = Some("Petrovich".into());
        assert_eq!(e.full_name(), "Ivanov Ivan Petrovich");
    }

    #[test]
    fn test_entry_rates() {
        let eq = RegistryEntry::Equipment(Equipment::new("Crane", Decimal::from(350)));
        assert_eq!(eq.rate(), Decimal::from(350));
        assert_eq!(eq.kind(), ResourceKind::Equipment);

        let sub = RegistryEntry::Subcontractor(Subcontractor::new("Acme", "7701234567", Decimal::from(8000)));
        assert_eq!(sub.rate(), Decimal::from(8000));
        assert_eq!(sub.display_name(), "Acme");
    }
}
