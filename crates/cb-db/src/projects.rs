//! PostgreSQL project store
//!
//! Tables: projects, project_resources

use async_trait::async_trait;
use cb_core::traits::Id;
use cb_models::{Project, ProjectResource, ResourceKind, ResourceRef};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::info;

use crate::repository::{
    CommittedRollup, ProjectStore, RepositoryError, RepositoryResult, RollupChangeset,
};

/// Project database entity
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: i64,
    pub tax_rate: Decimal,
    pub cost_price: Decimal,
    pub cost_with_margin: Decimal,
    pub net_profit: Decimal,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: Some(row.id),
            name: row.name,
            description: row.description,
            customer_id: row.customer_id,
            start_date: row.start_date,
            end_date: row.end_date,
            created_by: row.created_by,
            tax_rate: row.tax_rate,
            cost_price: row.cost_price,
            cost_with_margin: row.cost_with_margin,
            net_profit: row.net_profit,
            total_cost: row.total_cost,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Project resource database entity
///
/// The registry reference is spread over four nullable foreign keys; at most
/// one of them is set.
#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: i64,
    pub project_id: i64,
    pub kind: String,
    pub employee_id: Option<i64>,
    pub contractor_id: Option<i64>,
    pub subcontractor_id: Option<i64>,
    pub equipment_id: Option<i64>,
    pub name: String,
    pub service_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub quantity: Decimal,
    pub margin: Decimal,
    pub cost_price: Decimal,
    pub final_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ResourceRow> for ProjectResource {
    type Error = RepositoryError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let kind = ResourceKind::parse(&row.kind).ok_or_else(|| {
            RepositoryError::Corrupt(format!(
                "project_resources #{} has unknown kind '{}'",
                row.id, row.kind
            ))
        })?;
        let reference = ResourceRef::from_columns(
            row.employee_id,
            row.contractor_id,
            row.subcontractor_id,
            row.equipment_id,
        )
        .ok_or_else(|| {
            RepositoryError::Corrupt(format!(
                "project_resources #{} references more than one registry",
                row.id
            ))
        })?;

        Ok(ProjectResource {
            id: Some(row.id),
            project_id: row.project_id,
            kind,
            reference,
            name: row.name,
            service_name: row.service_name,
            start_date: row.start_date,
            end_date: row.end_date,
            quantity: row.quantity,
            margin: row.margin,
            cost_price: row.cost_price,
            final_cost: row.final_cost,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

const PROJECT_COLUMNS: &str = "id, name, description, customer_id, start_date, end_date, \
     created_by, tax_rate, cost_price, cost_with_margin, net_profit, total_cost, \
     created_at, updated_at";

const RESOURCE_COLUMNS: &str = "id, project_id, kind, employee_id, contractor_id, \
     subcontractor_id, equipment_id, name, service_name, start_date, end_date, quantity, \
     margin, cost_price, final_cost, created_at, updated_at";

/// Project store backed by PostgreSQL
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_project(tx: &mut Transaction<'_, Postgres>, project: &Project, id: Id) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            UPDATE projects
            SET name = $2, description = $3, customer_id = $4, start_date = $5, end_date = $6,
                tax_rate = $7, cost_price = $8, cost_with_margin = $9, net_profit = $10,
                total_cost = $11, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.customer_id)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.tax_rate)
        .bind(project.cost_price)
        .bind(project.cost_with_margin)
        .bind(project.net_profit)
        .bind(project.total_cost)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn upsert_resource(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Id,
        resource: &ProjectResource,
    ) -> RepositoryResult<()> {
        let (employee_id, contractor_id, subcontractor_id, equipment_id) = resource.reference.to_columns();

        match resource.id {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE project_resources
                    SET kind = $3, employee_id = $4, contractor_id = $5, subcontractor_id = $6,
                        equipment_id = $7, name = $8, service_name = $9, start_date = $10,
                        end_date = $11, quantity = $12, margin = $13, cost_price = $14,
                        final_cost = $15, updated_at = NOW()
                    WHERE id = $1 AND project_id = $2
                    "#,
                )
                .bind(id)
                .bind(project_id)
                .bind(resource.kind.as_str())
                .bind(employee_id)
                .bind(contractor_id)
                .bind(subcontractor_id)
                .bind(equipment_id)
                .bind(&resource.name)
                .bind(&resource.service_name)
                .bind(resource.start_date)
                .bind(resource.end_date)
                .bind(resource.quantity)
                .bind(resource.margin)
                .bind(resource.cost_price)
                .bind(resource.final_cost)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(RepositoryError::not_found("ProjectResource", id));
                }
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO project_resources
                        (project_id, kind, employee_id, contractor_id, subcontractor_id,
                         equipment_id, name, service_name, start_date, end_date, quantity,
                         margin, cost_price, final_cost)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    "#,
                )
                .bind(project_id)
                .bind(resource.kind.as_str())
                .bind(employee_id)
                .bind(contractor_id)
                .bind(subcontractor_id)
                .bind(equipment_id)
                .bind(&resource.name)
                .bind(&resource.service_name)
                .bind(resource.start_date)
                .bind(resource.end_date)
                .bind(resource.quantity)
                .bind(resource.margin)
                .bind(resource.cost_price)
                .bind(resource.final_cost)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn find_project(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::from))
    }

    async fn insert_project(&self, project: &Project) -> RepositoryResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects
                (name, description, customer_id, start_date, end_date, created_by, tax_rate,
                 cost_price, cost_with_margin, net_profit, total_cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.customer_id)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.created_by)
        .bind(project.tax_rate)
        .bind(project.cost_price)
        .bind(project.cost_with_margin)
        .bind(project.net_profit)
        .bind(project.total_cost)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_resource(&self, id: Id) -> RepositoryResult<Option<ProjectResource>> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM project_resources WHERE id = $1",
            RESOURCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProjectResource::try_from).transpose()
    }

    async fn list_resources(&self, project_id: Id) -> RepositoryResult<Vec<ProjectResource>> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM project_resources WHERE project_id = $1 ORDER BY id ASC",
            RESOURCE_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProjectResource::try_from).collect()
    }

    async fn commit_rollup(&self, changeset: RollupChangeset) -> RepositoryResult<CommittedRollup> {
        let project_id = changeset.project_id()?;
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent roll-ups of the same project; the
        // changeset is then checked against what is stored now
        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
            .bind(project_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(RepositoryError::not_found("Project", project_id));
        }

        let stamps = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "SELECT id, updated_at FROM project_resources WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await?;
        let stamps: Vec<(Id, Option<DateTime<Utc>>)> =
            stamps.into_iter().map(|(id, stamp)| (id, Some(stamp))).collect();
        changeset.verify_against(&stamps)?;

        if !changeset.removed.is_empty() {
            let result = sqlx::query("DELETE FROM project_resources WHERE project_id = $1 AND id = ANY($2)")
                .bind(project_id)
                .bind(&changeset.removed)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() != changeset.removed.len() as u64 {
                return Err(RepositoryError::NotFound(format!(
                    "resources {:?} of project #{}",
                    changeset.removed, project_id
                )));
            }
        }

        for resource in &changeset.upserts {
            Self::upsert_resource(&mut tx, project_id, resource).await?;
        }

        Self::update_project(&mut tx, &changeset.project, project_id).await?;
        tx.commit().await?;

        let project = self
            .find_project(project_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Project", project_id))?;
        let resources = self.list_resources(project_id).await?;

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
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM project_resources WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(RepositoryError::not_found("Project", id));
        }

        tx.commit().await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str) -> ResourceRow {
        let now = Utc::now();
        ResourceRow {
            id: 1,
            project_id: 2,
            kind: kind.to_string(),
            employee_id: None,
            contractor_id: None,
            subcontractor_id: None,
            equipment_id: Some(5),
            name: "Crane".to_string(),
            service_name: "Services: Crane".to_string(),
            start_date: None,
            end_date: None,
            quantity: Decimal::from(3),
            margin: Decimal::ZERO,
            cost_price: Decimal::from(1050),
            final_cost: Decimal::from(1050),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_resource_row_mapping() {
        let resource = ProjectResource::try_from(row("equipment")).unwrap();
        assert_eq!(resource.kind, ResourceKind::Equipment);
        assert_eq!(resource.reference, ResourceRef::Equipment(5));
        assert_eq!(resource.cost_price, Decimal::from(1050));
    }

    #[test]
    fn test_corrupt_rows() {
        assert!(matches!(
            ProjectResource::try_from(row("robot")),
            Err(RepositoryError::Corrupt(_))
        ));

        let mut both = row("equipment");
        both.employee_id = Some(1);
        assert!(matches!(ProjectResource::try_from(both), Err(RepositoryError::Corrupt(_))));
    }
}
