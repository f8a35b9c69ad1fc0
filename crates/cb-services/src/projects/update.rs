//! Update Service for Projects

use cb_contracts::base::{Contract, UserContext};
use cb_contracts::projects::UpdateProjectContract;
use cb_core::result::CbResult;
use cb_core::traits::Id;
use cb_models::{Project, UpdateProjectDto};
use tracing::{info, instrument};

use crate::base::{validate_dto, ServiceContext};
use crate::result::ServiceResult;

/// Edits a project's attributes
///
/// Every save re-rolls the project, so the stored totals always follow the
/// current tax rate and registry rates.
pub struct UpdateProjectService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> UpdateProjectService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip(self, dto), fields(user_id = self.user.user_id()))]
    pub async fn call(self, project_id: Id, dto: UpdateProjectDto) -> ServiceResult<Project> {
        self.run(project_id, dto).await.into()
    }

    async fn run(&self, project_id: Id, dto: UpdateProjectDto) -> CbResult<Project> {
        validate_dto(&dto)?;

        let stored = self.ctx.load_project(project_id).await?;
        let owner_id = stored.created_by;

        let mut project = stored;
        dto.apply_to(&mut project);
        UpdateProjectContract::new(self.user, owner_id).validate(&project)?;

        let resources = self.ctx.projects.list_resources(project_id).await?;
        let committed = self.ctx.rollup_and_commit(project, resources, Vec::new()).await?;

        info!(total_cost = %committed.project.total_cost, "project updated");
        Ok(committed.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::testing::{fixture, project};
    use crate::resources::AttachResourceService;
    use cb_core::traits::Actor;
    use cb_models::{AttachResourceDto, ResourceKind};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_tax_rate_change_rerolls_totals() {
        let f = fixture().await;
        let owner = Actor::user(1);
        let p = project(&f.ctx, 1).await;
        let project_id = p.id.unwrap();

        AttachResourceService::new(&f.ctx, &owner)
            .call(
                project_id,
                AttachResourceDto::new(ResourceKind::Employee, f.employee).quantity(Decimal::from(10)),
            )
            .await
            .unwrap();

        let dto = UpdateProjectDto {
            tax_rate: Some(Decimal::ZERO),
            ..Default::default()
        };
        let updated = UpdateProjectService::new(&f.ctx, &owner)
            .call(project_id, dto)
            .await
            .unwrap();

        assert_eq!(updated.cost_with_margin, Decimal::from(1000));
        assert_eq!(updated.total_cost, Decimal::from(1000));
    }

    #[tokio::test]
    async fn test_rename_keeps_totals() {
        let f = fixture().await;
        let owner = Actor::user(1);
        let p = project(&f.ctx, 1).await;

        let dto = UpdateProjectDto {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let updated = UpdateProjectService::new(&f.ctx, &owner)
            .call(p.id.unwrap(), dto)
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.total_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_rename_reprices_stale_resources() {
        let f = fixture().await;
        let owner = Actor::user(1);
        let p = project(&f.ctx, 1).await;
        let project_id = p.id.unwrap();

        f.store
            .seed_resource(
                cb_models::ProjectResource::new(project_id, ResourceKind::Employee, f.employee)
                    .with_quantity(Decimal::from(2)),
            )
            .unwrap();

        let dto = UpdateProjectDto {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let updated = UpdateProjectService::new(&f.ctx, &owner)
            .call(project_id, dto)
            .await
            .unwrap();
        assert_eq!(updated.cost_price, Decimal::from(200));
        assert_eq!(updated.total_cost, Decimal::from(240));
    }

    #[tokio::test]
    async fn test_stranger_cannot_update() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;

        let dto = UpdateProjectDto {
            name: Some("Hijacked".into()),
            ..Default::default()
        };
        let result = UpdateProjectService::new(&f.ctx, &Actor::user(2))
            .call(p.id.unwrap(), dto)
            .await;
        assert!(result.is_failure());
        assert!(result.errors().has_error("base"));

        let stored = f.ctx.load_project(p.id.unwrap()).await.unwrap();
        assert_eq!(stored.name, "Office fit-out");
    }

    #[tokio::test]
    async fn test_missing_project() {
        let f = fixture().await;
        let result = UpdateProjectService::new(&f.ctx, &Actor::admin(1))
            .call(99, UpdateProjectDto::default())
            .await;
        assert!(result.is_failure());
    }
}
