//! In-memory store
//!
//! Backs tests and the CLI snapshot mode. A roll-up commit validates the
//! whole changeset and then applies it while holding a single write lock,
//! so readers never observe a half-applied roll-up.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use cb_core::traits::Id;
use cb_models::{Project, ProjectResource, RegistryEntry, ResourceRef};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::repository::{
    CommittedRollup, ProjectStore, RegistryStore, RepositoryError, RepositoryResult,
    RollupChangeset,
};

#[derive(Debug, Default)]
struct ProjectTables {
    projects: BTreeMap<Id, Project>,
    resources: BTreeMap<Id, ProjectResource>,
}

impl ProjectTables {
    fn resources_of(&self, project_id: Id) -> Vec<ProjectResource> {
        self.resources
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect()
    }

    fn resource_stamps(&self, project_id: Id) -> Vec<(Id, Option<DateTime<Utc>>)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.project_id == project_id)
            .map(|(id, r)| (*id, r.updated_at))
            .collect()
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<ProjectTables>,
    registry: RwLock<HashMap<ResourceRef, RegistryEntry>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(ProjectTables::default()),
            registry: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> Id {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Keep generated ids above any id supplied by the caller
    fn reserve_id(&self, id: Id) {
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
    }

    /// Load a stored resource row as is, keeping its id and cost fields
    pub fn seed_resource(&self, resource: ProjectResource) -> RepositoryResult<ProjectResource> {
        let mut tables = self.tables.write().map_err(lock_error)?;
        if !tables.projects.contains_key(&resource.project_id) {
            return Err(RepositoryError::not_found("Project", resource.project_id));
        }

        let mut resource = resource;
        let id = match resource.id {
            Some(id) if tables.resources.contains_key(&id) => {
                return Err(RepositoryError::Conflict(format!("ProjectResource #{} already exists", id)))
            }
            Some(id) => {
                self.reserve_id(id);
                id
            }
            None => self.allocate_id(),
        };
        resource.id = Some(id);
        tables.resources.insert(id, resource.clone());
        Ok(resource)
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_project(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let tables = self.tables.read().map_err(lock_error)?;
        Ok(tables.projects.get(&id).cloned())
    }

    async fn insert_project(&self, project: &Project) -> RepositoryResult<Project> {
        let mut tables = self.tables.write().map_err(lock_error)?;
        let id = match project.id {
            Some(id) if tables.projects.contains_key(&id) => {
                return Err(RepositoryError::Conflict(format!("Project #{} already exists", id)))
            }
            Some(id) => {
                self.reserve_id(id);
                id
            }
            None => self.allocate_id(),
        };

        let now = Utc::now();
        let mut project = project.clone();
        project.id = Some(id);
        project.created_at.get_or_insert(now);
        project.updated_at = Some(now);
        tables.projects.insert(id, project.clone());

        debug!(project_id = id, "project inserted");
        Ok(project)
    }

    async fn find_resource(&self, id: Id) -> RepositoryResult<Option<ProjectResource>> {
        let tables = self.tables.read().map_err(lock_error)?;
        Ok(tables.resources.get(&id).cloned())
    }

    async fn list_resources(&self, project_id: Id) -> RepositoryResult<Vec<ProjectResource>> {
        let tables = self.tables.read().map_err(lock_error)?;
        Ok(tables.resources_of(project_id))
    }

    async fn commit_rollup(&self, changeset: RollupChangeset) -> RepositoryResult<CommittedRollup> {
        let project_id = changeset.project_id()?;
        let mut tables = self.tables.write().map_err(lock_error)?;

        // Check everything before touching anything
        if !tables.projects.contains_key(&project_id) {
            return Err(RepositoryError::not_found("Project", project_id));
        }
        changeset.verify_against(&tables.resource_stamps(project_id))?;

        let now = Utc::now();
        for id in &changeset.removed {
            tables.resources.remove(id);
        }
        for mut resource in changeset.upserts {
            let id = match resource.id {
                Some(id) => id,
                None => {
                    resource.created_at = Some(now);
                    self.allocate_id()
                }
            };
            resource.id = Some(id);
            resource.updated_at = Some(now);
            tables.resources.insert(id, resource);
        }

        let mut project = changeset.project;
        project.updated_at = Some(now);
        tables.projects.insert(project_id, project.clone());

        let resources = tables.resources_of(project_id);
        info!(
            project_id,
            resources = resources.len(),
            removed = changeset.removed.len(),
            total_cost = %project.total_cost,
            "roll-up committed"
        );

        Ok(CommittedRollup { project, resources })
    }

    async fn delete_project(&self, id: Id) -> RepositoryResult<u64> {
        let mut tables = self.tables.write().map_err(lock_error)?;
        if tables.projects.remove(&id).is_none() {
            return Err(RepositoryError::not_found("Project", id));
        }
        let before = tables.resources.len();
        tables.resources.retain(|_, r| r.project_id != id);
        Ok((before - tables.resources.len()) as u64)
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn find_entry(&self, reference: ResourceRef) -> RepositoryResult<Option<RegistryEntry>> {
        let registry = self.registry.read().map_err(lock_error)?;
        Ok(registry.get(&reference).cloned())
    }

    async fn save_entry(&self, entry: RegistryEntry) -> RepositoryResult<ResourceRef> {
        let mut entry = entry;
        let id = match entry_id(&entry) {
            Some(id) => {
                self.reserve_id(id);
                id
            }
            None => {
                let id = self.allocate_id();
                set_entry_id(&mut entry, id);
                id
            }
        };

        let reference = ResourceRef::new(entry.kind(), id);
        let mut registry = self.registry.write().map_err(lock_error)?;
        registry.insert(reference, entry);
        Ok(reference)
    }
}

fn entry_id(entry: &RegistryEntry) -> Option<Id> {
    match entry {
        RegistryEntry::Employee(e) => e.id,
        RegistryEntry::Contractor(c) => c.id,
        RegistryEntry::Subcontractor(s) => s.id,
        RegistryEntry::Equipment(e) => e.id,
    }
}

fn set_entry_id(entry: &mut RegistryEntry, id: Id) {
    match entry {
        RegistryEntry::Employee(e) => e.id = Some(id),
        RegistryEntry::Contractor(c) => c.id = Some(id),
        RegistryEntry::Subcontractor(s) => s.id = Some(id),
        RegistryEntry::Equipment(e) => e.id = Some(id),
    }
}
