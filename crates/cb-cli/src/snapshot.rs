//! JSON snapshots of a single project
//!
//! A snapshot carries a project, its resources and the registry entries
//! they reference. It is loaded into a [`MemoryStore`] so the regular
//! services can roll it up without a database.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use cb_contracts::base::{Contract, ValidationErrors};
use cb_contracts::projects::ProjectBaseContract;
use cb_contracts::registries::{
    ContractorContract, EmployeeContract, EquipmentContract, SubcontractorContract,
};
use cb_contracts::resources::ResourceBaseContract;
use cb_core::traits::{Actor, Id};
use cb_db::{MemoryStore, ProjectStore, RegistryStore};
use cb_models::{
    Contractor, Employee, Equipment, NmaCostSheet, Project, ProjectResource, RegistryEntry,
    Subcontractor,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project: Project,
    #[serde(default)]
    pub resources: Vec<ProjectResource>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub contractors: Vec<Contractor>,
    #[serde(default)]
    pub subcontractors: Vec<Subcontractor>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

impl ProjectSnapshot {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        read_json(path)
    }

    /// Registry entries after running their contracts
    fn registry_entries(&self) -> anyhow::Result<Vec<RegistryEntry>> {
        let mut entries = Vec::new();
        for employee in &self.employees {
            check("employee", employee.id, EmployeeContract.validate(employee))?;
            entries.push(RegistryEntry::Employee(employee.clone()));
        }
        for contractor in &self.contractors {
            check("contractor", contractor.id, ContractorContract.validate(contractor))?;
            entries.push(RegistryEntry::Contractor(contractor.clone()));
        }
        for subcontractor in &self.subcontractors {
            check("subcontractor", subcontractor.id, SubcontractorContract.validate(subcontractor))?;
            entries.push(RegistryEntry::Subcontractor(subcontractor.clone()));
        }
        for equipment in &self.equipment {
            check("equipment", equipment.id, EquipmentContract.validate(equipment))?;
            entries.push(RegistryEntry::Equipment(equipment.clone()));
        }
        Ok(entries)
    }

    /// Run the project and resource contracts over the snapshot rows
    fn validate_project(&self) -> anyhow::Result<()> {
        let loader = Actor::admin(self.project.created_by);
        check(
            "project",
            self.project.id,
            ProjectBaseContract::new(&loader).validate(&self.project),
        )?;
        for resource in &self.resources {
            check("resource", resource.id, ResourceBaseContract.validate(resource))?;
        }
        Ok(())
    }

    /// Load everything into a fresh store; returns the store and the
    /// stored project's id.
    ///
    /// Resources are re-homed onto the snapshot project, whatever
    /// `project_id` they carry. Nothing is stored unless every row passes
    /// its contract.
    pub async fn into_store(self) -> anyhow::Result<(Arc<MemoryStore>, Id)> {
        let entries = self.registry_entries()?;
        self.validate_project()?;

        let store = Arc::new(MemoryStore::new());
        for entry in entries {
            store.save_entry(entry).await?;
        }

        let project = store.insert_project(&self.project).await?;
        let project_id = project
            .id
            .ok_or_else(|| anyhow!("stored project has no id"))?;

        let count = self.resources.len();
        for mut resource in self.resources {
            resource.project_id = project_id;
            store.seed_resource(resource)?;
        }

        debug!(project_id, resources = count, "snapshot loaded");
        Ok((store, project_id))
    }
}

pub fn read_nma_sheet(path: &Path) -> anyhow::Result<NmaCostSheet> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn check(what: &str, id: Option<Id>, result: Result<(), ValidationErrors>) -> anyhow::Result<()> {
    if let Err(errors) = result {
        let id = id.map_or_else(|| "new".to_string(), |id| format!("#{}", id));
        bail!("invalid {} {}: {}", what, id, errors.full_messages().join(", "));
    }
    Ok(())
}
