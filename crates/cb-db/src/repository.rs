//! Store traits shared by the in-memory and PostgreSQL backends

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use cb_core::error::CbError;
use cb_core::traits::Id;
use cb_models::{Project, ProjectResource, RegistryEntry, ResourceRef};
use chrono::{DateTime, Utc};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored row cannot be mapped back to a model
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        RepositoryError::NotFound(format!("{} #{}", entity, id))
    }
}

impl From<RepositoryError> for CbError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => CbError::NotFound {
                entity: "record",
                field: "id",
                value: what,
            },
            RepositoryError::Conflict(message) => CbError::Conflict { message },
            other => CbError::Database(other.to_string()),
        }
    }
}

/// One roll-up, applied all-or-nothing
///
/// Carries the project with its recomputed totals, every resource that was
/// added or repriced, and the ids of resources to remove.
#[derive(Debug, Clone)]
pub struct RollupChangeset {
    pub project: Project,
    pub upserts: Vec<ProjectResource>,
    pub removed: Vec<Id>,
}

impl RollupChangeset {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            upserts: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn upsert(mut self, resources: impl IntoIterator<Item = ProjectResource>) -> Self {
        self.upserts.extend(resources);
        self
    }

    pub fn remove(mut self, id: Id) -> Self {
        self.removed.push(id);
        self
    }

    /// Project id, required for every commit
    pub fn project_id(&self) -> RepositoryResult<Id> {
        self.project
            .id
            .ok_or_else(|| RepositoryError::NotFound("unsaved project".to_string()))
    }

    /// Check the changeset against the project's stored resources, given as
    /// `(id, updated_at)` pairs read while the project is locked.
    ///
    /// A roll-up reprices every resource of its project. A stored resource
    /// the changeset neither rewrites nor removes, or one rewritten since
    /// the changeset was read, makes the changeset stale.
    pub fn verify_against(&self, stored: &[(Id, Option<DateTime<Utc>>)]) -> RepositoryResult<()> {
        let project_id = self.project_id()?;
        let stamps: HashMap<Id, Option<DateTime<Utc>>> = stored.iter().copied().collect();

        for id in &self.removed {
            if !stamps.contains_key(id) {
                return Err(RepositoryError::not_found("ProjectResource", *id));
            }
        }
        for resource in &self.upserts {
            if resource.project_id != project_id {
                return Err(RepositoryError::Conflict(format!(
                    "resource belongs to project #{}, not #{}",
                    resource.project_id, project_id
                )));
            }
            let Some(id) = resource.id else { continue };
            match stamps.get(&id) {
                None => return Err(RepositoryError::not_found("ProjectResource", id)),
                Some(stamp) if *stamp != resource.updated_at => {
                    return Err(RepositoryError::Conflict(format!(
                        "resource #{} changed since the roll-up was read",
                        id
                    )))
                }
                Some(_) => {}
            }
        }

        let covered: HashSet<Id> = self
            .upserts
            .iter()
            .filter_map(|r| r.id)
            .chain(self.removed.iter().copied())
            .collect();
        let mut unseen: Vec<Id> = stamps.keys().filter(|id| !covered.contains(id)).copied().collect();
        if !unseen.is_empty() {
            unseen.sort_unstable();
            return Err(RepositoryError::Conflict(format!(
                "project #{} gained resources {:?} since the roll-up was read",
                project_id, unseen
            )));
        }
        Ok(())
    }
}

/// State of a project right after a committed roll-up
#[derive(Debug, Clone)]
pub struct CommittedRollup {
    pub project: Project,
    pub resources: Vec<ProjectResource>,
}

/// Projects and their resources
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_project(&self, id: Id) -> RepositoryResult<Option<Project>>;

    /// Persist a new project, assigning an id when it has none
    async fn insert_project(&self, project: &Project) -> RepositoryResult<Project>;

    async fn find_resource(&self, id: Id) -> RepositoryResult<Option<ProjectResource>>;

    /// Resources of a project, ordered by id
    async fn list_resources(&self, project_id: Id) -> RepositoryResult<Vec<ProjectResource>>;

    /// Write project totals, resource upserts and removals as one unit
    async fn commit_rollup(&self, changeset: RollupChangeset) -> RepositoryResult<CommittedRollup>;

    /// Delete a project and its resources; returns the number of resources removed
    async fn delete_project(&self, id: Id) -> RepositoryResult<u64>;
}

/// Employees, contractors, subcontractors and equipment
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Entry behind a reference, active or not
    async fn find_entry(&self, reference: ResourceRef) -> RepositoryResult<Option<RegistryEntry>>;

    /// Insert or replace an entry, assigning an id when it has none
    async fn save_entry(&self, entry: RegistryEntry) -> RepositoryResult<ResourceRef>;

    /// Resolve several references; unresolved ones are left out
    async fn find_entries(
        &self,
        references: &[ResourceRef],
    ) -> RepositoryResult<Vec<(ResourceRef, RegistryEntry)>> {
        let mut found = Vec::with_capacity(references.len());
        for reference in references {
            if reference.is_none() {
                continue;
            }
            if let Some(entry) = self.find_entry(*reference).await? {
                found.push((*reference, entry));
            }
        }
        Ok(found)
    }
}
