//! Arithmetic failures of the roll-up

use cb_core::error::ValidationErrors;
use cb_core::traits::Id;
use thiserror::Error;

/// An amount left the range a `Decimal` can hold.
///
/// Contract limits keep validated input well inside that range; this is
/// what the checked roll-up reports for anything that slipped past them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CostOverflow {
    #[error("cost of resource {} is too large to compute", display_id(.resource_id))]
    Resource { resource_id: Option<Id> },

    #[error("project totals are too large to compute")]
    Totals,

    #[error("total of item '{name}' is too large to compute")]
    Item { name: String },
}

fn display_id(id: &Option<Id>) -> String {
    id.map_or_else(|| "(new)".to_string(), |id| format!("#{}", id))
}

impl From<CostOverflow> for ValidationErrors {
    fn from(err: CostOverflow) -> Self {
        let mut errors = ValidationErrors::new();
        match err {
            CostOverflow::Resource { .. } => errors.add("quantity", err.to_string()),
            CostOverflow::Totals => errors.add_base(err.to_string()),
            CostOverflow::Item { .. } => errors.add("items", err.to_string()),
        }
        errors
    }
}
