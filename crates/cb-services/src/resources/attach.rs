//! Attach Service for Project Resources

use std::collections::HashSet;

use cb_contracts::base::{Contract, UserContext};
use cb_contracts::resources::AttachResourceContract;
use cb_core::error::CbError;
use cb_core::result::CbResult;
use cb_core::traits::Id;
use cb_models::AttachResourceDto;
use tracing::{info, instrument, warn};

use crate::base::{validate_dto, ResourceChange, ServiceContext};
use crate::result::ServiceResult;

/// Adds a resource to a project and re-rolls the project totals.
///
/// Blank names are filled from the referenced registry entry.
///
/// # Example
/// ```ignore
/// let dto = AttachResourceDto::new(ResourceKind::Employee, ResourceRef::Employee(3))
///     .quantity(Decimal::from(10))
///     .margin(Decimal::from(15));
/// let change = AttachResourceService::new(&ctx, &user).call(project_id, dto).await;
/// ```
pub struct AttachResourceService<'a, U: UserContext> {
    ctx: &'a ServiceContext,
    user: &'a U,
}

impl<'a, U: UserContext> AttachResourceService<'a, U> {
    pub fn new(ctx: &'a ServiceContext, user: &'a U) -> Self {
        Self { ctx, user }
    }

    #[instrument(skip(self, dto), fields(user_id = self.user.user_id(), kind = %dto.kind))]
    pub async fn call(self, project_id: Id, dto: AttachResourceDto) -> ServiceResult<ResourceChange> {
        self.run(project_id, dto).await.into()
    }

    async fn run(&self, project_id: Id, dto: AttachResourceDto) -> CbResult<ResourceChange> {
        validate_dto(&dto)?;

        let project = self.ctx.load_project(project_id).await?;
        let mut resource = dto.into_resource(project_id);

        AttachResourceContract::new(self.user, &project).validate(&resource)?;

        match self.ctx.registry_entry(&resource).await? {
            Some(entry) => resource.autofill_names(&entry.display_name()),
            None if !resource.reference.is_none() => {
                warn!(reference = %resource.reference, "attached resource references a missing registry entry");
            }
            None => {}
        }

        let mut resources = self.ctx.projects.list_resources(project_id).await?;
        let existing: HashSet<Id> = resources.iter().filter_map(|r| r.id).collect();
        resources.push(resource);

        let rollup = self.ctx.rollup_and_commit(project, resources, Vec::new()).await?;
        let resource = rollup
            .resources
            .iter()
            .find(|r| r.id.is_some_and(|id| !existing.contains(&id)))
            .cloned()
            .ok_or_else(|| CbError::Internal("attached resource missing after commit".into()))?;

        info!(
            resource_id = ?resource.id,
            final_cost = %resource.final_cost,
            total_cost = %rollup.project.total_cost,
            "resource attached"
        );
        Ok(ResourceChange { resource, rollup })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::testing::{fixture, project};
    use cb_core::traits::Actor;
    use cb_models::{ResourceKind, ResourceRef};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_employee_with_margin() {
        let f = fixture().await;
        let owner = Actor::user(1);
        let p = project(&f.ctx, 1).await;

        let dto = AttachResourceDto::new(ResourceKind::Employee, f.employee)
            .quantity(Decimal::from(10))
            .margin(Decimal::from(15));
        let change = AttachResourceService::new(&f.ctx, &owner)
            .call(p.id.unwrap(), dto)
            .await
            .unwrap();

        assert_eq!(change.resource.cost_price, dec("1000.00"));
        assert_eq!(change.resource.final_cost, dec("1150.00"));
        assert_eq!(change.rollup.project.cost_price, dec("1000.00"));
        assert_eq!(change.rollup.project.cost_with_margin, dec("1150.00"));
        assert_eq!(change.rollup.project.net_profit, dec("150.00"));
        assert_eq!(change.rollup.project.total_cost, dec("1380.00"));
    }

    #[tokio::test]
    async fn test_names_filled_from_registry() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;

        let change = AttachResourceService::new(&f.ctx, &Actor::user(1))
            .call(p.id.unwrap(), AttachResourceDto::new(ResourceKind::Employee, f.employee))
            .await
            .unwrap();
        assert_eq!(change.resource.name, "Ivanov Ivan Petrovich");
        assert_eq!(change.resource.service_name, "Services: Ivanov Ivan Petrovich");
    }

    #[tokio::test]
    async fn test_mixed_project_totals() {
        let f = fixture().await;
        let owner = Actor::user(1);
        let p = project(&f.ctx, 1).await;
        let project_id = p.id.unwrap();
        AttachResourceService::new(&f.ctx, &owner)
            .call(
                project_id,
                AttachResourceDto::new(ResourceKind::Subcontractor, f.subcontractor)
                    .quantity(Decimal::from(3))
                    .margin(Decimal::from(10)),
            )
            .await
            .unwrap();
        let change = AttachResourceService::new(&f.ctx, &owner)
            .call(
                project_id,
                AttachResourceDto::new(ResourceKind::Equipment, f.equipment).quantity(Decimal::from(2)),
            )
            .await
            .unwrap();

        // 3 * 400 = 1200 (+10% = 1320); 2 * 350 = 700
        assert_eq!(change.rollup.resources.len(), 2);
        assert_eq!(change.rollup.project.cost_price, dec("1900.00"));
        assert_eq!(change.rollup.project.cost_with_margin, dec("2020.00"));
        assert_eq!(change.rollup.project.net_profit, dec("120.00"));
        assert_eq!(change.rollup.project.total_cost, dec("2424.00"));
    }

    #[tokio::test]
    async fn test_unreferenced_resource_prices_at_zero() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;

        let mut dto = AttachResourceDto::new(ResourceKind::Equipment, ResourceRef::None)
            .quantity(Decimal::from(5));
        dto.name = Some("Scaffolding".into());
        let change = AttachResourceService::new(&f.ctx, &Actor::user(1))
            .call(p.id.unwrap(), dto)
            .await
            .unwrap();

        assert_eq!(change.resource.name, "Scaffolding");
        assert_eq!(change.resource.final_cost, Decimal::ZERO);
        assert_eq!(change.rollup.project.total_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_mismatched_reference_rejected() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;

        let result = AttachResourceService::new(&f.ctx, &Actor::user(1))
            .call(p.id.unwrap(), AttachResourceDto::new(ResourceKind::Contractor, f.employee))
            .await;
        assert!(result.errors().has_error("reference"));
        assert!(f.ctx.projects.list_resources(p.id.unwrap()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;

        let dto = AttachResourceDto::new(ResourceKind::Employee, f.employee).quantity(Decimal::from(-1));
        let result = AttachResourceService::new(&f.ctx, &Actor::user(1))
            .call(p.id.unwrap(), dto)
            .await;
        assert!(result.errors().has_error("quantity"));
    }

    #[tokio::test]
    async fn test_stranger_cannot_attach() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;

        let result = AttachResourceService::new(&f.ctx, &Actor::user(2))
            .call(p.id.unwrap(), AttachResourceDto::new(ResourceKind::Employee, f.employee))
            .await;
        assert!(result.is_failure());
        assert!(f.ctx.projects.list_resources(p.id.unwrap()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_quantity_rejected() {
        let f = fixture().await;
        let p = project(&f.ctx, 1).await;

        let dto = AttachResourceDto::new(ResourceKind::Employee, f.employee)
            .quantity(dec("1000000000000000000000000000"));
        let result = AttachResourceService::new(&f.ctx, &Actor::user(1))
            .call(p.id.unwrap(), dto)
            .await;
        assert!(result.errors().has_error("quantity"));
        assert!(f.ctx.projects.list_resources(p.id.unwrap()).await.unwrap().is_empty());
    }
}
