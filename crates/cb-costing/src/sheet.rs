//! Cost sheet read model
//!
//! Flattened view of a rolled-up project for presentation and export
//! layers. Values are plain decimals; formatting is left to the consumer.

use cb_core::traits::Id;
use cb_models::{Project, ProjectResource, ResourceKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::{CostEngine, ProjectTotals};
use crate::rates::RateLookup;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSheetLine {
    pub resource_id: Option<Id>,
    pub name: String,
    pub kind: ResourceKind,
    pub quantity: Decimal,
    pub rate: Option<Decimal>,
    pub margin: Decimal,
    pub cost_price: Decimal,
    pub final_cost: Decimal,
    /// False when the line priced at zero for lack of a registry entry
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCostSheet {
    pub project_id: Option<Id>,
    pub project_name: String,
    pub tax_rate: Decimal,
    pub lines: Vec<CostSheetLine>,
    #[serde(flatten)]
    pub totals: ProjectTotals,
}

impl ProjectCostSheet {
    /// Build from an already rolled-up project and its resources
    ///
    /// Rates are looked up again only to report them per line; stored cost
    /// fields are taken as they are.
    pub fn build<L: RateLookup + ?Sized>(
        project: &Project,
        resources: &[ProjectResource],
        rates: &L,
    ) -> Self {
        let engine = CostEngine::default().warn_on_unresolved(false);
        let lines = resources
            .iter()
            .map(|resource| {
                let rate = engine.price(resource, rates).rate;
                CostSheetLine {
                    resource_id: resource.id,
                    name: resource.name.clone(),
                    kind: resource.kind,
                    quantity: resource.quantity,
                    rate,
                    margin: resource.margin,
                    cost_price: resource.cost_price,
                    final_cost: resource.final_cost,
                    resolved: rate.is_some(),
                }
            })
            .collect();

        Self {
            project_id: project.id,
            project_name: project.name.clone(),
            tax_rate: project.tax_rate,
            lines,
            totals: ProjectTotals::of(project),
        }
    }

    pub fn unresolved_lines(&self) -> impl Iterator<Item = &CostSheetLine> {
        self.lines.iter().filter(|line| !line.resolved)
    }
}
