//! Recompute Service for Projects

use cb_contracts::base::UserContext;
use cb_core::error::CbError;
use cb_core::result::CbResult;
use cb_core::traits::Id;
use cb_db::CommittedRollup;
use tracing::{info, instrument};

use crate::base::ServiceContext;
use crate::result::ServiceResult;

/// Reprices every resource of a project against current registry rates
/// and rewrites the project totals.
///
/// Run after registry rates change; resource edits already re-roll the
/// project on their own.
pub struct RecomputeProjectService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> RecomputeProjectService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip(self), fields(user_id = self.user.user_id()))]
    pub async fn call(self, project_id: Id) -> ServiceResult<CommittedRollup> {
        self.run(project_id).await.into()
    }

    async fn run(&self, project_id: Id) -> CbResult<CommittedRollup> {
        let project = self.ctx.load_project(project_id).await?;
        if !self.user.may_manage(project.created_by) {
            return Err(CbError::Forbidden {
                message: "You are not authorized to recompute this project".into(),
            });
        }

        let resources = self.ctx.projects.list_resources(project_id).await?;
        let committed = self.ctx.rollup_and_commit(project, resources, Vec::new()).await?;

        info!(
            resources = committed.resources.len(),
            total_cost = %committed.project.total_cost,
            "project recomputed"
        );
        Ok(committed)
    }
}
