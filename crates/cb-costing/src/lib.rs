//! # cb-costing
//!
//! Project cost roll-up engine.
//!
//! Pure functions over project and resource snapshots. Registry rates are
//! supplied through [`RateLookup`]; nothing in this crate performs I/O.

pub mod engine;
pub mod error;
pub mod nma;
pub mod rates;
pub mod sheet;

pub use engine::{compute_resource_cost, recompute_project_totals, CostEngine, ProjectTotals, ResourceCost};
pub use error::CostOverflow;
pub use rates::{RateLookup, RateTable};
pub use sheet::{CostSheetLine, ProjectCostSheet};
