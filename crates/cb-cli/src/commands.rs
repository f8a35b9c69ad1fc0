//! Subcommand implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cb_contracts::base::Contract;
use cb_contracts::nma::NmaSheetContract;
use cb_core::config::AppConfig;
use cb_core::traits::{Actor, Id};
use cb_costing::nma::recompute_sheet;
use cb_costing::ProjectCostSheet;
use cb_db::{Database, DatabaseConfig, PgProjectStore, PgRegistryStore};
use cb_models::NmaCostSheet;
use cb_services::{RecomputeProjectService, ServiceContext};
use tracing::{info, warn};

use crate::snapshot::{read_nma_sheet, ProjectSnapshot};

/// The CLI acts with administrator rights on whatever it is pointed at
const OPERATOR: Actor = Actor { id: 0, admin: true };

/// Roll up a snapshot file and return its cost sheet
pub async fn rollup_snapshot(path: &Path, config: &AppConfig) -> anyhow::Result<ProjectCostSheet> {
    let (store, project_id) = ProjectSnapshot::read(path)?.into_store().await?;
    let ctx = ServiceContext::new(store.clone(), store).with_costing(&config.costing);
    recompute(&ctx, project_id).await
}

/// Recompute and commit a project stored in PostgreSQL
pub async fn recompute_stored(project_id: Id, config: &AppConfig) -> anyhow::Result<ProjectCostSheet> {
    let mut db_config = DatabaseConfig::from_settings(&config.database);
    db_config.url = AppConfig::require_database_url(|key| std::env::var(key).ok())?;
    let db = Database::connect(&db_config)
        .await
        .context("connecting to the database")?;
    db.migrate().await.context("running migrations")?;

    let pool = db.pool().clone();
    let ctx = ServiceContext::new(
        Arc::new(PgProjectStore::new(pool.clone())),
        Arc::new(PgRegistryStore::new(pool)),
    )
    .with_costing(&config.costing);

    let sheet = recompute(&ctx, project_id).await;
    db.close().await;
    sheet
}

async fn recompute(ctx: &ServiceContext, project_id: Id) -> anyhow::Result<ProjectCostSheet> {
    let rollup = RecomputeProjectService::new(ctx, &OPERATOR)
        .call(project_id)
        .await
        .into_result()
        .with_context(|| format!("recomputing project #{}", project_id))?;

    let rates = ctx.rate_table(&rollup.resources).await?;
    let sheet = ProjectCostSheet::build(&rollup.project, &rollup.resources, &rates);

    let unresolved = sheet.unresolved_lines().count();
    if unresolved > 0 {
        warn!(unresolved, "some resources priced at zero");
    }
    info!(project_id, total_cost = %sheet.totals.total_cost, "cost sheet ready");
    Ok(sheet)
}

/// Validate an NMA sheet and refresh its totals
pub fn rollup_nma(path: &Path, config: &AppConfig) -> anyhow::Result<NmaCostSheet> {
    let mut sheet = read_nma_sheet(path)?;
    NmaSheetContract
        .validate(&sheet)
        .with_context(|| format!("invalid NMA sheet {}", path.display()))?;

    let total = recompute_sheet(&mut sheet, config.costing.precision())
        .with_context(|| format!("rolling up NMA sheet {}", path.display()))?;
    info!(items = sheet.items.len(), total_cost = %total, "NMA sheet rolled up");
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_rollup_snapshot() {
        let file = write_temp(
            r#"{
                "project": { "id": 1, "name": "Mixed", "created_by": 3 },
                "resources": [
                    { "project_id": 1, "kind": "subcontractor",
                      "reference": { "type": "subcontractor", "id": 10 },
                      "name": "Acme", "quantity": "3", "margin": "10" },
                    { "project_id": 1, "kind": "equipment",
                      "reference": { "type": "equipment", "id": 11 },
                      "name": "Crane", "quantity": "2" },
                    { "project_id": 1, "kind": "contractor",
                      "name": "Ghost", "quantity": "5" }
                ],
                "subcontractors": [
                    { "id": 10, "name": "Acme", "inn": "7701234567", "daily_rate": "400" }
                ],
                "equipment": [
                    { "id": 11, "name": "Crane", "service_cost_per_unit": "350" }
                ]
            }"#,
        );

        let sheet = rollup_snapshot(file.path(), &AppConfig::default()).await.unwrap();
        assert_eq!(sheet.lines.len(), 3);
        assert_eq!(sheet.unresolved_lines().count(), 1);
        assert_eq!(sheet.totals.cost_price, dec("1900.00"));
        assert_eq!(sheet.totals.cost_with_margin, dec("2020.00"));
        assert_eq!(sheet.totals.net_profit, dec("120.00"));
        assert_eq!(sheet.totals.total_cost, dec("2424.00"));
    }

    #[tokio::test]
    async fn test_rollup_snapshot_ignores_stale_stored_costs() {
        let file = write_temp(
            r#"{
                "project": { "id": 1, "name": "Stale", "created_by": 3, "tax_rate": "0",
                             "total_cost": "99999" },
                "resources": [
                    { "project_id": 1, "kind": "employee",
                      "reference": { "type": "employee", "id": 5 },
                      "quantity": "1.5", "cost_price": "1", "final_cost": "1" }
                ],
                "employees": [
                    { "id": 5, "last_name": "Petrova", "first_name": "Anna", "hourly_rate": "80" }
                ]
            }"#,
        );

        let sheet = rollup_snapshot(file.path(), &AppConfig::default()).await.unwrap();
        assert_eq!(sheet.lines[0].rate, Some(dec("80")));
        assert_eq!(sheet.lines[0].final_cost, dec("120.00"));
        assert_eq!(sheet.totals.total_cost, dec("120.00"));
    }

    #[test]
    fn test_rollup_nma() {
        let file = write_temp(
            r#"{
                "project_name": "CRM module",
                "development_period": "Q3",
                "items": [
                    { "name": "Design", "quantity": "40", "unit": "hours", "unit_cost": "25" },
                    { "name": "Licence", "quantity": "3", "unit": "pcs", "unit_cost": "150.50" }
                ]
            }"#,
        );

        let sheet = rollup_nma(file.path(), &AppConfig::default()).unwrap();
        assert_eq!(sheet.items[1].total_cost, dec("451.50"));
        assert_eq!(sheet.total_cost, dec("1451.50"));
    }

    #[test]
    fn test_rollup_nma_rejects_negative_quantity() {
        let file = write_temp(
            r#"{
                "project_name": "CRM module",
                "items": [
                    { "name": "Design", "quantity": "-1", "unit": "hours", "unit_cost": "25" }
                ]
            }"#,
        );
        assert!(rollup_nma(file.path(), &AppConfig::default()).is_err());
    }
}
