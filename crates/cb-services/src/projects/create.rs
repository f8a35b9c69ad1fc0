//! Create Service for Projects

use cb_contracts::base::{Contract, UserContext};
use cb_contracts::projects::CreateProjectContract;
use cb_core::result::CbResult;
use cb_models::{CreateProjectDto, Project};
use tracing::{info, instrument};

use crate::base::{validate_dto, ServiceContext};
use crate::result::ServiceResult;

/// Creates a project owned by the acting user
///
/// # Example
/// ```ignore
/// let service = CreateProjectService::new(&ctx, &user);
/// let project = service.call(CreateProjectDto { name: "Fit-out".into(), ..Default::default() }).await;
/// ```
pub struct CreateProjectService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> CreateProjectService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip(self, dto), fields(user_id = self.user.user_id(), name = %dto.name))]
    pub async fn call(self, dto: CreateProjectDto) -> ServiceResult<Project> {
        self.run(dto).await.into()
    }

    async fn run(&self, dto: CreateProjectDto) -> CbResult<Project> {
        validate_dto(&dto)?;

        let mut project = Project::new(dto.name, self.user.user_id())
            .with_tax_rate(dto.tax_rate.unwrap_or(self.ctx.default_tax_rate));
        project.description = dto.description;
        project.customer_id = dto.customer_id;
        project.start_date = dto.start_date;
        project.end_date = dto.end_date;

        CreateProjectContract::new(self.user).validate(&project)?;

        let project = self.ctx.projects.insert_project(&project).await?;
        info!(project_id = ?project.id, "project created");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::testing::fixture;
    use cb_core::traits::Actor;
    use rust_decimal::Decimal;

    fn dto(name: &str) -> CreateProjectDto {
        CreateProjectDto {
            name: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_uses_default_tax_rate() {
        let f = fixture().await;
        let user = Actor::user(5);
        let project = CreateProjectService::new(&f.ctx, &user)
            .call(dto("Warehouse"))
            .await
            .unwrap();

        assert!(project.id.is_some());
        assert_eq!(project.created_by, 5);
        assert_eq!(project.tax_rate, Decimal::from(20));
        assert_eq!(project.total_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_create_with_explicit_tax_rate() {
        let f = fixture().await;
        let user = Actor::user(5);
        let mut input = dto("Warehouse");
        input.tax_rate = Some(Decimal::ZERO);

        let project = CreateProjectService::new(&f.ctx, &user).call(input).await.unwrap();
        assert_eq!(project.tax_rate, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let f = fixture().await;
        let user = Actor::user(5);
        let result = CreateProjectService::new(&f.ctx, &user).call(dto("")).await;
        assert!(result.is_failure());
        assert!(result.errors().has_error("name"));
    }

    #[tokio::test]
    async fn test_tax_rate_out_of_range_rejected() {
        let f = fixture().await;
        let user = Actor::user(5);
        let mut input = dto("Warehouse");
        input.tax_rate = Some(Decimal::from(150));

        let result = CreateProjectService::new(&f.ctx, &user).call(input).await;
        assert!(result.errors().has_error("tax_rate"));
    }
}
