//! Shared service plumbing
//!
//! Every write that touches a project's resources ends in
//! [`ServiceContext::rollup_and_commit`]: rates are loaded, every remaining
//! resource is repriced, totals are recomputed, and the lot is committed
//! through one `commit_rollup` call.

use std::sync::Arc;

use cb_core::config::CostingConfig;
use cb_core::error::{CbError, ValidationErrors};
use cb_core::result::CbResult;
use cb_core::traits::Id;
use cb_costing::{CostEngine, RateTable};
use cb_db::{CommittedRollup, ProjectStore, RegistryStore, RollupChangeset};
use cb_models::{Project, ProjectResource, RegistryEntry, ResourceRef, DEFAULT_TAX_RATE};
use rust_decimal::Decimal;
use tracing::debug;

/// Stores and engine settings shared by all services
#[derive(Clone)]
pub struct ServiceContext {
    pub projects: Arc<dyn ProjectStore>,
    pub registry: Arc<dyn RegistryStore>,
    pub engine: CostEngine,
    /// Applied to projects created without a tax rate
    pub default_tax_rate: Decimal,
}

impl ServiceContext {
    pub fn new(projects: Arc<dyn ProjectStore>, registry: Arc<dyn RegistryStore>) -> Self {
        Self {
            projects,
            registry,
            engine: CostEngine::default(),
            default_tax_rate: DEFAULT_TAX_RATE,
        }
    }

    pub fn with_costing(mut self, costing: &CostingConfig) -> Self {
        self.engine = CostEngine::new(costing.precision()).warn_on_unresolved(costing.warn_on_unresolved);
        self.default_tax_rate = costing.default_tax_rate;
        self
    }

    pub async fn load_project(&self, id: Id) -> CbResult<Project> {
        self.projects
            .find_project(id)
            .await?
            .ok_or_else(|| CbError::not_found("Project", id))
    }

    pub async fn load_resource(&self, id: Id) -> CbResult<ProjectResource> {
        self.projects
            .find_resource(id)
            .await?
            .ok_or_else(|| CbError::not_found("ProjectResource", id))
    }

    /// Registry entry a resource is priced from, if its reference resolves
    pub async fn registry_entry(&self, resource: &ProjectResource) -> CbResult<Option<RegistryEntry>> {
        match resource.priced_reference() {
            Some(reference) => Ok(self.registry.find_entry(reference).await?),
            None => Ok(None),
        }
    }

    /// Rates for every resolvable reference among `resources`
    pub async fn rate_table(&self, resources: &[ProjectResource]) -> CbResult<RateTable> {
        let mut references: Vec<ResourceRef> = resources
            .iter()
            .filter_map(ProjectResource::priced_reference)
            .collect();
        references.sort_by_key(|r| (r.kind(), r.id()));
        references.dedup();

        let mut table = RateTable::new();
        for (reference, entry) in self.registry.find_entries(&references).await? {
            table.insert_entry(reference, &entry);
        }

        debug!(
            requested = references.len(),
            resolved = table.len(),
            "registry rates loaded"
        );
        Ok(table)
    }

    /// Reprice `resources`, recompute `project` and commit both together
    /// with the removal of `removed`
    pub async fn rollup_and_commit(
        &self,
        mut project: Project,
        mut resources: Vec<ProjectResource>,
        removed: Vec<Id>,
    ) -> CbResult<CommittedRollup> {
        let rates = self.rate_table(&resources).await?;
        self.engine
            .try_rollup(&mut project, &mut resources, &rates)
            .map_err(ValidationErrors::from)?;

        let mut changeset = RollupChangeset::new(project).upsert(resources);
        changeset.removed = removed;
        Ok(self.projects.commit_rollup(changeset).await?)
    }
}

/// Run `#[derive(Validate)]` rules on a DTO
pub fn validate_dto<T: validator::Validate>(dto: &T) -> Result<(), ValidationErrors> {
    dto.validate().map_err(ValidationErrors::from)
}

/// A committed roll-up together with the resource that triggered it
#[derive(Debug, Clone)]
pub struct ResourceChange {
    pub resource: ProjectResource,
    pub rollup: CommittedRollup,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use cb_db::MemoryStore;
    use cb_models::{Employee, Equipment, Subcontractor};

    pub struct Fixture {
        pub store: Arc<MemoryStore>,
        pub ctx: ServiceContext,
        pub employee: ResourceRef,
        pub subcontractor: ResourceRef,
        pub equipment: ResourceRef,
    }

    /// Employee at 100/h, subcontractor at 400/day, equipment at 350/unit
    pub async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let ctx = ServiceContext::new(store.clone(), store.clone());

        let mut ivanov = Employee::new("Ivanov", "Ivan", Decimal::from(100));
        ivanov.middle_name = Some("Petrovich".into());
        let employee = store.save_entry(RegistryEntry::Employee(ivanov)).await.unwrap();
        let subcontractor = store
            .save_entry(RegistryEntry::Subcontractor(Subcontractor::new(
                "Acme Build",
                "7701234567",
                Decimal::from(400),
            )))
            .await
            .unwrap();
        let equipment = store
            .save_entry(RegistryEntry::Equipment(Equipment::new("Crane", Decimal::from(350))))
            .await
            .unwrap();

        Fixture {
            store,
            ctx,
            employee,
            subcontractor,
            equipment,
        }
    }

    pub async fn project(ctx: &ServiceContext, owner: Id) -> Project {
        ctx.projects.insert_project(&Project::new("Office fit-out", owner)).await.unwrap()
    }
}
