//! Update Service for Project Resources

use cb_contracts::base::{Contract, UserContext};
use cb_contracts::resources::UpdateResourceContract;
use cb_core::error::CbError;
use cb_core::result::CbResult;
use cb_core::traits::Id;
use cb_models::UpdateResourceDto;
use tracing::{info, instrument};

use crate::base::{validate_dto, ResourceChange, ServiceContext};
use crate::result::ServiceResult;

/// Edits an attached resource and re-rolls its project
pub struct UpdateResourceService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> UpdateResourceService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip(self, dto), fields(user_id = self.user.user_id()))]
    pub async fn call(self, resource_id: Id, dto: UpdateResourceDto) -> ServiceResult<ResourceChange> {
        self.run(resource_id, dto).await.into()
    }

    async fn run(&self, resource_id: Id, dto: UpdateResourceDto) -> CbResult<ResourceChange> {
        validate_dto(&dto)?;

        let mut resource = self.ctx.load_resource(resource_id).await?;
        let project = self.ctx.load_project(resource.project_id).await?;
        dto.apply_to(&mut resource);

        UpdateResourceContract::new(self.user, &project).validate(&resource)?;

        let project_id = resource.project_id;
        let resources: Vec<_> = self
            .ctx
            .projects
            .list_resources(project_id)
            .await?
            .into_iter()
            .map(|stored| if stored.id == Some(resource_id) { resource.clone() } else { stored })
            .collect();

        let rollup = self.ctx.rollup_and_commit(project, resources, Vec::new()).await?;
        let resource = rollup
            .resources
            .iter()
            .find(|r| r.id == Some(resource_id))
            .cloned()
            .ok_or_else(|| CbError::not_found("ProjectResource", resource_id))?;

        info!(
            resource_id,
            final_cost = %resource.final_cost,
            total_cost = %rollup.project.total_cost,
            "resource updated"
        );
        Ok(ResourceChange { resource, rollup })
    }
}
