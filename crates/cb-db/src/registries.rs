//! PostgreSQL registry store
//!
//! Tables: employees, contractors, subcontractors, equipment

use async_trait::async_trait;
use cb_models::{
    AcquisitionType, ContractType, Contractor, Employee, Equipment, EquipmentUnit, RegistryEntry,
    ResourceRef, Subcontractor,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::repository::{RegistryStore, RepositoryError, RepositoryResult};

#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub position: Option<String>,
    pub hourly_rate: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ContractorRow {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub contract_type: String,
    pub tax_rate: Decimal,
    pub hourly_rate: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubcontractorRow {
    pub id: i64,
    pub name: String,
    pub inn: String,
    pub director_name: Option<String>,
    pub email: Option<String>,
    pub daily_rate: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct EquipmentRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub acquisition_type: String,
    pub operational_cost: Option<Decimal>,
    pub unit: String,
    pub service_cost_per_unit: Decimal,
    pub is_active: bool,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: Some(row.id),
            last_name: row.last_name,
            first_name: row.first_name,
            middle_name: row.middle_name,
            position: row.position,
            hourly_rate: row.hourly_rate,
            is_active: row.is_active,
        }
    }
}

impl TryFrom<ContractorRow> for Contractor {
    type Error = RepositoryError;

    fn try_from(row: ContractorRow) -> Result<Self, Self::Error> {
        let contract_type = match row.contract_type.as_str() {
            "self_employed" => ContractType::SelfEmployed,
            "individual" => ContractType::Individual,
            "sole_proprietor" => ContractType::SoleProprietor,
            other => return Err(corrupt("contractors", row.id, "contract_type", other)),
        };
        Ok(Contractor {
            id: Some(row.id),
            last_name: row.last_name,
            first_name: row.first_name,
            middle_name: row.middle_name,
            contract_type,
            tax_rate: row.tax_rate,
            hourly_rate: row.hourly_rate,
        })
    }
}

impl From<SubcontractorRow> for Subcontractor {
    fn from(row: SubcontractorRow) -> Self {
        Subcontractor {
            id: Some(row.id),
            name: row.name,
            inn: row.inn,
            director_name: row.director_name,
            email: row.email,
            daily_rate: row.daily_rate,
            is_active: row.is_active,
        }
    }
}

impl TryFrom<EquipmentRow> for Equipment {
    type Error = RepositoryError;

    fn try_from(row: EquipmentRow) -> Result<Self, Self::Error> {
        let acquisition_type = match row.acquisition_type.as_str() {
            "own" => AcquisitionType::Own,
            "rent" => AcquisitionType::Rent,
            other => return Err(corrupt("equipment", row.id, "acquisition_type", other)),
        };
        let unit = match row.unit.as_str() {
            "hours" => EquipmentUnit::Hours,
            "days" => EquipmentUnit::Days,
            "full" => EquipmentUnit::Full,
            other => return Err(corrupt("equipment", row.id, "unit", other)),
        };
        Ok(Equipment {
            id: Some(row.id),
            name: row.name,
            description: row.description,
            acquisition_type,
            operational_cost: row.operational_cost,
            unit,
            service_cost_per_unit: row.service_cost_per_unit,
            is_active: row.is_active,
        })
    }
}

fn corrupt(table: &str, id: i64, column: &str, value: &str) -> RepositoryError {
    RepositoryError::Corrupt(format!("{} #{} has unknown {} '{}'", table, id, column, value))
}

fn contract_type_str(value: ContractType) -> &'static str {
    match value {
        ContractType::SelfEmployed => "self_employed",
        ContractType::Individual => "individual",
        ContractType::SoleProprietor => "sole_proprietor",
    }
}

fn acquisition_type_str(value: AcquisitionType) -> &'static str {
    match value {
        AcquisitionType::Own => "own",
        AcquisitionType::Rent => "rent",
    }
}

fn unit_str(value: EquipmentUnit) -> &'static str {
    match value {
        EquipmentUnit::Hours => "hours",
        EquipmentUnit::Days => "days",
        EquipmentUnit::Full => "full",
    }
}

/// Registry store backed by PostgreSQL
pub struct PgRegistryStore {
    pool: PgPool,
}

impl PgRegistryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn save_employee(&self, e: &Employee) -> RepositoryResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO employees (id, last_name, first_name, middle_name, position, hourly_rate, is_active)
            VALUES (COALESCE($1, nextval('employees_id_seq')), $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET last_name = EXCLUDED.last_name, first_name = EXCLUDED.first_name,
                middle_name = EXCLUDED.middle_name, position = EXCLUDED.position,
                hourly_rate = EXCLUDED.hourly_rate, is_active = EXCLUDED.is_active
            RETURNING id
            "#,
        )
        .bind(e.id)
        .bind(&e.last_name)
        .bind(&e.first_name)
        .bind(&e.middle_name)
        .bind(&e.position)
        .bind(e.hourly_rate)
        .bind(e.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn save_contractor(&self, c: &Contractor) -> RepositoryResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO contractors (id, last_name, first_name, middle_name, contract_type, tax_rate, hourly_rate)
            VALUES (COALESCE($1, nextval('contractors_id_seq')), $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET last_name = EXCLUDED.last_name, first_name = EXCLUDED.first_name,
                middle_name = EXCLUDED.middle_name, contract_type = EXCLUDED.contract_type,
                tax_rate = EXCLUDED.tax_rate, hourly_rate = EXCLUDED.hourly_rate
            RETURNING id
            "#,
        )
        .bind(c.id)
        .bind(&c.last_name)
        .bind(&c.first_name)
        .bind(&c.middle_name)
        .bind(contract_type_str(c.contract_type))
        .bind(c.tax_rate)
        .bind(c.hourly_rate)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn save_subcontractor(&self, s: &Subcontractor) -> RepositoryResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO subcontractors (id, name, inn, director_name, email, daily_rate, is_active)
            VALUES (COALESCE($1, nextval('subcontractors_id_seq')), $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, inn = EXCLUDED.inn, director_name = EXCLUDED.director_name,
                email = EXCLUDED.email, daily_rate = EXCLUDED.daily_rate,
                is_active = EXCLUDED.is_active
            RETURNING id
            "#,
        )
        .bind(s.id)
        .bind(&s.name)
        .bind(&s.inn)
        .bind(&s.director_name)
        .bind(&s.email)
        .bind(s.daily_rate)
        .bind(s.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn save_equipment(&self, e: &Equipment) -> RepositoryResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO equipment
                (id, name, description, acquisition_type, operational_cost, unit,
                 service_cost_per_unit, is_active)
            VALUES (COALESCE($1, nextval('equipment_id_seq')), $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, description = EXCLUDED.description,
                acquisition_type = EXCLUDED.acquisition_type,
                operational_cost = EXCLUDED.operational_cost, unit = EXCLUDED.unit,
                service_cost_per_unit = EXCLUDED.service_cost_per_unit,
                is_active = EXCLUDED.is_active
            RETURNING id
            "#,
        )
        .bind(e.id)
        .bind(&e.name)
        .bind(&e.description)
        .bind(acquisition_type_str(e.acquisition_type))
        .bind(e.operational_cost)
        .bind(unit_str(e.unit))
        .bind(e.service_cost_per_unit)
        .bind(e.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

#[async_trait]
impl RegistryStore for PgRegistryStore {
    async fn find_entry(&self, reference: ResourceRef) -> RepositoryResult<Option<RegistryEntry>> {
        let entry = match reference {
            ResourceRef::Employee(id) => sqlx::query_as::<_, EmployeeRow>(
                "SELECT id, last_name, first_name, middle_name, position, hourly_rate, is_active \
                 FROM employees WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| RegistryEntry::Employee(row.into())),

            ResourceRef::Contractor(id) => sqlx::query_as::<_, ContractorRow>(
                "SELECT id, last_name, first_name, middle_name, contract_type, tax_rate, hourly_rate \
                 FROM contractors WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Contractor::try_from)
            .transpose()?
            .map(RegistryEntry::Contractor),

            ResourceRef::Subcontractor(id) => sqlx::query_as::<_, SubcontractorRow>(
                "SELECT id, name, inn, director_name, email, daily_rate, is_active \
                 FROM subcontractors WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| RegistryEntry::Subcontractor(row.into())),

            ResourceRef::Equipment(id) => sqlx::query_as::<_, EquipmentRow>(
                "SELECT id, name, description, acquisition_type, operational_cost, unit, \
                 service_cost_per_unit, is_active FROM equipment WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Equipment::try_from)
            .transpose()?
            .map(RegistryEntry::Equipment),

            ResourceRef::None => None,
        };

        Ok(entry)
    }

    async fn save_entry(&self, entry: RegistryEntry) -> RepositoryResult<ResourceRef> {
        let kind = entry.kind();
        let id = match &entry {
            RegistryEntry::Employee(e) => self.save_employee(e).await?,
            RegistryEntry::Contractor(c) => self.save_contractor(c).await?,
            RegistryEntry::Subcontractor(s) => self.save_subcontractor(s).await?,
            RegistryEntry::Equipment(e) => self.save_equipment(e).await?,
        };
        Ok(ResourceRef::new(kind, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_row_mapping() {
        let row = EquipmentRow {
            id: 3,
            name: "Crane".into(),
            description: None,
            acquisition_type: "rent".into(),
            operational_cost: Some(Decimal::from(200)),
            unit: "days".into(),
            service_cost_per_unit: Decimal::from(350),
            is_active: false,
        };
        let equipment = Equipment::try_from(row.clone()).unwrap();
        assert_eq!(equipment.acquisition_type, AcquisitionType::Rent);
        assert_eq!(equipment.unit, EquipmentUnit::Days);
        assert_eq!(acquisition_type_str(equipment.acquisition_type), "rent");
        assert_eq!(unit_str(equipment.unit), "days");

        let bad = EquipmentRow {
            unit: "weeks".into(),
            ..row
        };
        assert!(matches!(Equipment::try_from(bad), Err(RepositoryError::Corrupt(_))));
    }

    #[test]
    fn test_contractor_type_mapping() {
        let row = ContractorRow {
            id: 1,
            last_name: "Petrov".into(),
            first_name: "Petr".into(),
            middle_name: None,
            contract_type: "sole_proprietor".into(),
            tax_rate: Decimal::from(6),
            hourly_rate: Decimal::from(90),
        };
        let contractor = Contractor::try_from(row).unwrap();
        assert_eq!(contractor.contract_type, ContractType::SoleProprietor);
        assert_eq!(contract_type_str(contractor.contract_type), "sole_proprietor");
    }
}
