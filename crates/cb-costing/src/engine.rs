//! Cost roll-up engine
//!
//! Two pure operations over snapshots:
//!
//! - [`CostEngine::compute_resource_cost`] prices one resource from its
//!   registry rate, quantity and margin.
//! - [`CostEngine::recompute_project_totals`] aggregates already-priced
//!   resources into the four project totals and applies tax.
//!
//! Amounts are rounded to the configured scale at each stored field:
//! `cost_price = round(rate × quantity)`,
//! `final_cost = round(cost_price × (1 + margin/100))`,
//! `net_profit = cost_with_margin − cost_price` and
//! `total_cost = round(cost_with_margin × (1 + tax_rate/100))`.

use cb_core::money::{apply_percent, Precision};
use cb_models::{Project, ProjectResource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CostOverflow;
use crate::rates::RateLookup;

/// Outcome of pricing one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Registry rate used, `None` when the reference did not resolve
    pub rate: Option<Decimal>,
    pub cost_price: Decimal,
    pub final_cost: Decimal,
}

impl ResourceCost {
    pub const UNRESOLVED: ResourceCost = ResourceCost {
        rate: None,
        cost_price: Decimal::ZERO,
        final_cost: Decimal::ZERO,
    };

    pub fn is_resolved(&self) -> bool {
        self.rate.is_some()
    }
}

/// The four computed project fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub cost_price: Decimal,
    pub cost_with_margin: Decimal,
    pub net_profit: Decimal,
    pub total_cost: Decimal,
}

impl ProjectTotals {
    pub fn of(project: &Project) -> Self {
        Self {
            cost_price: project.cost_price,
            cost_with_margin: project.cost_with_margin,
            net_profit: project.net_profit,
            total_cost: project.total_cost,
        }
    }

    pub fn apply_to(&self, project: &mut Project) {
        project.cost_price = self.cost_price;
        project.cost_with_margin = self.cost_with_margin;
        project.net_profit = self.net_profit;
        project.total_cost = self.total_cost;
    }
}

/// Roll-up engine configured with a rounding precision
#[derive(Debug, Clone, Copy)]
pub struct CostEngine {
    precision: Precision,
    warn_on_unresolved: bool,
}

impl Default for CostEngine {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            warn_on_unresolved: true,
        }
    }
}

impl CostEngine {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            ..Default::default()
        }
    }

    /// Whether zero-priced unresolved references are logged at warn level
    pub fn warn_on_unresolved(mut self, enabled: bool) -> Self {
        self.warn_on_unresolved = enabled;
        self
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Price a resource without modifying it.
    ///
    /// Fails open: an unresolved reference, or an amount too large to
    /// compute, prices at zero.
    pub fn price<L: RateLookup + ?Sized>(&self, resource: &ProjectResource, rates: &L) -> ResourceCost {
        self.try_price(resource, rates).unwrap_or_else(|err| {
            warn!(
                resource_id = ?resource.id,
                project_id = resource.project_id,
                error = %err,
                "resource cost overflowed, pricing at zero"
            );
            ResourceCost::UNRESOLVED
        })
    }

    /// Price a resource with checked arithmetic
    pub fn try_price<L: RateLookup + ?Sized>(
        &self,
        resource: &ProjectResource,
        rates: &L,
    ) -> Result<ResourceCost, CostOverflow> {
        let rate = resource
            .priced_reference()
            .and_then(|reference| rates.rate(&reference));

        let Some(rate) = rate else {
            if self.warn_on_unresolved {
                warn!(
                    resource_id = ?resource.id,
                    project_id = resource.project_id,
                    kind = %resource.kind,
                    reference = %resource.reference,
                    "resource reference unresolved, pricing at zero"
                );
            }
            return Ok(ResourceCost::UNRESOLVED);
        };

        let overflow = || CostOverflow::Resource {
            resource_id: resource.id,
        };
        let cost_price = self
            .precision
            .round(rate.checked_mul(resource.quantity).ok_or_else(overflow)?);
        let final_cost = self
            .precision
            .round(apply_percent(cost_price, resource.margin).ok_or_else(overflow)?);

        Ok(ResourceCost {
            rate: Some(rate),
            cost_price,
            final_cost,
        })
    }

    /// Recompute `cost_price` and `final_cost` of a resource in place
    pub fn compute_resource_cost<L: RateLookup + ?Sized>(
        &self,
        resource: &mut ProjectResource,
        rates: &L,
    ) -> ResourceCost {
        let cost = self.price(resource, rates);
        resource.cost_price = cost.cost_price;
        resource.final_cost = cost.final_cost;

        debug!(
            resource_id = ?resource.id,
            project_id = resource.project_id,
            quantity = %resource.quantity,
            margin = %resource.margin,
            cost_price = %cost.cost_price,
            final_cost = %cost.final_cost,
            "resource priced"
        );

        cost
    }

    /// Aggregate priced resources into project totals.
    ///
    /// Totals too large to compute come back as zero, with a warning.
    pub fn totals(&self, tax_rate: Decimal, resources: &[ProjectResource]) -> ProjectTotals {
        self.try_totals(tax_rate, resources).unwrap_or_else(|err| {
            warn!(error = %err, resources = resources.len(), "project totals overflowed");
            ProjectTotals::default()
        })
    }

    /// Aggregate priced resources with checked arithmetic
    pub fn try_totals(&self, tax_rate: Decimal, resources: &[ProjectResource]) -> Result<ProjectTotals, CostOverflow> {
        self.aggregate(tax_rate, resources.iter().map(|r| (r.cost_price, r.final_cost)))
    }

    fn aggregate(
        &self,
        tax_rate: Decimal,
        costs: impl IntoIterator<Item = (Decimal, Decimal)>,
    ) -> Result<ProjectTotals, CostOverflow> {
        let mut cost_price = Decimal::ZERO;
        let mut cost_with_margin = Decimal::ZERO;
        for (cp, fc) in costs {
            cost_price = cost_price.checked_add(cp).ok_or(CostOverflow::Totals)?;
            cost_with_margin = cost_with_margin.checked_add(fc).ok_or(CostOverflow::Totals)?;
        }

        Ok(ProjectTotals {
            cost_price,
            cost_with_margin,
            net_profit: cost_with_margin.checked_sub(cost_price).ok_or(CostOverflow::Totals)?,
            total_cost: self
                .precision
                .round(apply_percent(cost_with_margin, tax_rate).ok_or(CostOverflow::Totals)?),
        })
    }

    /// Recompute the four project totals in place
    pub fn recompute_project_totals(
        &self,
        project: &mut Project,
        resources: &[ProjectResource],
    ) -> ProjectTotals {
        let totals = self.totals(project.tax_rate, resources);
        totals.apply_to(project);

        debug!(
            project_id = ?project.id,
            resources = resources.len(),
            cost_price = %totals.cost_price,
            cost_with_margin = %totals.cost_with_margin,
            total_cost = %totals.total_cost,
            "project totals recomputed"
        );

        totals
    }

    /// Price every resource, then aggregate into the project
    pub fn rollup<L: RateLookup + ?Sized>(
        &self,
        project: &mut Project,
        resources: &mut [ProjectResource],
        rates: &L,
    ) -> ProjectTotals {
        for resource in resources.iter_mut() {
            self.compute_resource_cost(resource, rates);
        }
        self.recompute_project_totals(project, resources)
    }

    /// Checked [`rollup`](Self::rollup).
    ///
    /// Every amount is computed before anything is written, so on error
    /// `project` and `resources` are left as they were.
    pub fn try_rollup<L: RateLookup + ?Sized>(
        &self,
        project: &mut Project,
        resources: &mut [ProjectResource],
        rates: &L,
    ) -> Result<ProjectTotals, CostOverflow> {
        let costs = resources
            .iter()
            .map(|resource| self.try_price(resource, rates))
            .collect::<Result<Vec<_>, _>>()?;
        let totals = self.aggregate(
            project.tax_rate,
            costs.iter().map(|cost| (cost.cost_price, cost.final_cost)),
        )?;

        for (resource, cost) in resources.iter_mut().zip(&costs) {
            resource.cost_price = cost.cost_price;
            resource.final_cost = cost.final_cost;
        }
        totals.apply_to(project);

        debug!(
            project_id = ?project.id,
            resources = resources.len(),
            total_cost = %totals.total_cost,
            "project rolled up"
        );
        Ok(totals)
    }
}

/// [`CostEngine::compute_resource_cost`] at the default precision
pub fn compute_resource_cost<L: RateLookup + ?Sized>(resource: &mut ProjectResource, rates: &L) -> ResourceCost {
    CostEngine::default().compute_resource_cost(resource, rates)
}

/// [`CostEngine::recompute_project_totals`] at the default precision
pub fn recompute_project_totals(project: &mut Project, resources: &[ProjectResource]) -> ProjectTotals {
    CostEngine::default().recompute_project_totals(project, resources)
}
