//! Detach Service for Project Resources

use cb_contracts::base::{Contract, UserContext};
use cb_contracts::resources::DetachResourceContract;
use cb_core::result::CbResult;
use cb_core::traits::Id;
use cb_db::CommittedRollup;
use tracing::{info, instrument};

use crate::base::ServiceContext;
use crate::result::ServiceResult;

/// Removes a resource from its project; the remaining resources are
/// repriced and the totals rewritten in the same commit.
pub struct DetachResourceService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> DetachResourceService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip(self), fields(user_id = self.user.user_id()))]
    pub async fn call(self, resource_id: Id) -> ServiceResult<CommittedRollup> {
        self.run(resource_id).await.into()
    }

    async fn run(&self, resource_id: Id) -> CbResult<CommittedRollup> {
        let resource = self.ctx.load_resource(resource_id).await?;
        let project = self.ctx.load_project(resource.project_id).await?;

        DetachResourceContract::new(self.user, &project).validate(&resource)?;

        let remaining: Vec<_> = self
            .ctx
            .projects
            .list_resources(resource.project_id)
            .await?
            .into_iter()
            .filter(|r| r.id != Some(resource_id))
            .collect();

        let rollup = self
            .ctx
            .rollup_and_commit(project, remaining, vec![resource_id])
            .await?;

        info!(
            remaining = rollup.resources.len(),
            total_cost = %rollup.project.total_cost,
            "resource detached"
        );
        Ok(rollup)
    }
}
