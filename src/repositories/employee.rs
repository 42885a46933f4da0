//! Employee repository for database operations
//!
//! SeaORM-backed [`EmployeeStore`] over the employees table.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::filter::FilterBuilder;
use super::{EmployeeStore, Listing, PageRequest, fetch_listing};
use crate::models::employee::{self, Entity as Employee};
use crate::models::fold_case;

/// Optional employee list filters; every present value must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact CPF
    pub cpf: Option<String>,
    /// Case-insensitive substring of the RG
    pub rg: Option<String>,
    pub department_id: Option<Uuid>,
}

impl EmployeeFilter {
    pub fn condition(&self) -> Condition {
        FilterBuilder::new()
            .contains(employee::Column::NameSearch, self.name.as_deref())
            .equals_text(employee::Column::Cpf, self.cpf.as_deref())
            .contains(employee::Column::RgSearch, self.rg.as_deref())
            .equals(employee::Column::DepartmentId, self.department_id)
            .build()
    }
}

/// Repository for employee database operations
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl EmployeeRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
    async fn add(&self, employee: employee::Model) -> Result<u64, DbErr> {
        let active = employee::ActiveModel {
            id: Set(employee.id),
            name_search: Set(fold_case(&employee.name)),
            name: Set(employee.name),
            cpf: Set(employee.cpf),
            rg_search: Set(employee.rg.as_deref().map(fold_case)),
            rg: Set(employee.rg),
            department_id: Set(employee.department_id),
            created_at: Set(employee.created_at),
        };

        Employee::insert(active)
            .exec_without_returning(&*self.db)
            .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<employee::Model>, DbErr> {
        Employee::find_by_id(id).one(&*self.db).await
    }

    async fn get_by_cpf(&self, cpf: &str) -> Result<Option<employee::Model>, DbErr> {
        Employee::find()
            .filter(employee::Column::Cpf.eq(cpf))
            .one(&*self.db)
            .await
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<employee::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Employee::find()
            .filter(employee::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await
    }

    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: Option<PageRequest>,
    ) -> Result<Listing<employee::Model>, DbErr> {
        let select = Employee::find()
            .filter(filter.condition())
            .order_by_asc(employee::Column::Name)
            .order_by_asc(employee::Column::Id);

        fetch_listing(&self.db, select, page).await
    }

    async fn update(&self, employee: employee::Model) -> Result<employee::Model, DbErr> {
        let mut active = employee.clone().into_active_model();
        active.name_search = Set(fold_case(&employee.name));
        active.name = Set(employee.name);
        active.cpf = Set(employee.cpf);
        active.rg_search = Set(employee.rg.as_deref().map(fold_case));
        active.rg = Set(employee.rg);
        active.department_id = Set(employee.department_id);

        active.update(&*self.db).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = Employee::delete_by_id(id).exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
