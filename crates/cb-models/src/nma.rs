//! Intangible asset (NMA) cost sheets
//!
//! Tables: nma_cost_sheets, nma_resource_items

use chrono::{DateTime, Utc};
use cb_core::traits::{Entity, Id, Identifiable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line of an NMA cost sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NmaResourceItem {
    #[serde(default)]
    pub id: Option<Id>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: Decimal,
    /// Unit of measure, e.g. "pcs" or "hours"
    #[validate(length(min = 1, max = 50))]
    pub unit: String,
    pub unit_cost: Decimal,
    /// quantity × unit_cost
    #[serde(default)]
    pub total_cost: Decimal,
}

impl NmaResourceItem {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit: impl Into<String>, unit_cost: Decimal) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            quantity,
            unit: unit.into(),
            unit_cost,
            total_cost: Decimal::ZERO,
        }
    }
}

/// Cost sheet for developing an intangible asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NmaCostSheet {
    #[serde(default)]
    pub id: Option<Id>,
    #[validate(length(min = 1, max = 255))]
    pub project_name: String,
    #[serde(default)]
    pub development_period: Option<String>,
    /// Σ item total_cost
    #[serde(default)]
    pub total_cost: Decimal,
    #[serde(default)]
    pub items: Vec<NmaResourceItem>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NmaCostSheet {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            id: None,
            project_name: project_name.into(),
            development_period: None,
            total_cost: Decimal::ZERO,
            items: Vec::new(),
            created_at: None,
        }
    }
}

impl Identifiable for NmaCostSheet {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for NmaCostSheet {
    const TABLE_NAME: &'static str = "nma_cost_sheets";
    const TYPE_NAME: &'static str = "NmaCostSheet";
}
