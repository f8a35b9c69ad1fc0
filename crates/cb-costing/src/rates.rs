//! Rate resolution
//!
//! The engine never touches storage. Callers load the registry rates they
//! need up front and hand the engine something implementing [`RateLookup`].

use std::collections::HashMap;

use cb_models::{RegistryEntry, ResourceRef};
use rust_decimal::Decimal;

/// Resolves a registry reference to its per-unit rate
pub trait RateLookup {
    /// `None` when the reference is unset or points at nothing
    fn rate(&self, reference: &ResourceRef) -> Option<Decimal>;
}

impl<T: RateLookup + ?Sized> RateLookup for &T {
    fn rate(&self, reference: &ResourceRef) -> Option<Decimal> {
        (**self).rate(reference)
    }
}

impl RateLookup for HashMap<ResourceRef, Decimal> {
    fn rate(&self, reference: &ResourceRef) -> Option<Decimal> {
        self.get(reference).copied()
    }
}

/// Snapshot of registry rates keyed by reference
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<ResourceRef, Decimal>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: ResourceRef, rate: Decimal) {
        if !reference.is_none() {
            self.rates.insert(reference, rate);
        }
    }

    pub fn with(mut self, reference: ResourceRef, rate: Decimal) -> Self {
        self.insert(reference, rate);
        self
    }

    /// Record the rate of a loaded registry entry
    pub fn insert_entry(&mut self, reference: ResourceRef, entry: &RegistryEntry) {
        if reference.kind() == Some(entry.kind()) {
            self.insert(reference, entry.rate());
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateLookup for RateTable {
    fn rate(&self, reference: &ResourceRef) -> Option<Decimal> {
        self.rates.get(reference).copied()
    }
}

impl FromIterator<(ResourceRef, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (ResourceRef, Decimal)>>(iter: I) -> Self {
        let mut table = RateTable::new();
        for (reference, rate) in iter {
            table.insert(reference, rate);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_models::{Employee, Equipment};

    #[test]
    fn test_none_is_never_stored() {
        let table = RateTable::new().with(ResourceRef::None, Decimal::TEN);
        assert!(table.is_empty());
        assert_eq!(table.rate(&ResourceRef::None), None);
    }

    #[test]
    fn test_insert_entry_checks_kind() {
        let mut table = RateTable::new();
        let crane = RegistryEntry::Equipment(Equipment::new("Crane", Decimal::from(350)));
        table.insert_entry(ResourceRef::Equipment(1), &crane);
        table.insert_entry(ResourceRef::Employee(1), &crane);

        assert_eq!(table.rate(&ResourceRef::Equipment(1)), Some(Decimal::from(350)));
        assert_eq!(table.rate(&ResourceRef::Employee(1)), None);
    }

    #[test]
    fn test_ids_are_scoped_by_kind() {
        let table: RateTable = [
            (ResourceRef::Employee(1), Decimal::from(100)),
            (ResourceRef::Contractor(1), Decimal::from(90)),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rate(&ResourceRef::Contractor(1)), Some(Decimal::from(90)));

        let inactive = RegistryEntry::Employee(Employee {
            is_active: false,
            ..Employee::new("Sidorov", "Ivan", Decimal::from(70))
        });
        let mut table = table;
        table.insert_entry(ResourceRef::Employee(2), &inactive);
        assert_eq!(table.rate(&ResourceRef::Employee(2)), Some(Decimal::from(70)));
    }
}
