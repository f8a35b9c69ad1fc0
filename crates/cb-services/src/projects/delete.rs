//! Delete Service for Projects

use cb_contracts::base::{Contract, UserContext};
use cb_contracts::projects::DeleteProjectContract;
use cb_core::result::CbResult;
use cb_core::traits::Id;
use tracing::{info, instrument};

use crate::base::ServiceContext;
use crate::result::ServiceResult;

/// Deletes a project together with its resources.
///
/// Returns the number of resources removed by the cascade.
pub struct DeleteProjectService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> DeleteProjectService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip(self), fields(user_id = self.user.user_id()))]
    pub async fn call(self, project_id: Id) -> ServiceResult<u64> {
        self.run(project_id).await.into()
    }

    async fn run(&self, project_id: Id) -> CbResult<u64> {
        let project = self.ctx.load_project(project_id).await?;
        DeleteProjectContract::new(self.user).validate(&project)?;

        let removed = self.ctx.projects.delete_project(project_id).await?;
        info!(removed_resources = removed, "project deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::testing::{fixture, project};
    use cb_core::traits::Actor;
    use cb_models::{ProjectResource, ResourceKind};

    #[tokio::test]
    async fn test_delete_cascades_to_resources() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;
        let project_id = p.id.unwrap();
        let resource = f
            .store
            .seed_resource(ProjectResource::new(project_id, ResourceKind::Employee, f.employee))
            .unwrap();

        let removed = DeleteProjectService::new(&f.ctx, &Actor::user(1))
            .call(project_id)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(f.ctx.projects.find_project(project_id).await.unwrap().is_none());
        assert!(f.ctx.projects.find_resource(resource.id.unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_admin_may_delete_foreign_project() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;
        let result = DeleteProjectService::new(&f.ctx, &Actor::admin(42))
            .call(p.id.unwrap())
            .await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_stranger_cannot_delete() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;
        let result = DeleteProjectService::new(&f.ctx, &Actor::user(2))
            .call(p.id.unwrap())
            .await;
        assert!(result.is_failure());
        assert!(f.ctx.projects.find_project(p.id.unwrap()).await.unwrap().is_some());
    }
}
