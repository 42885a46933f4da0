//! # Repository Layer
//!
//! This module contains the store abstractions used by the application layer
//! and their SeaORM implementations for the employees and departments tables.

pub mod department;
pub mod employee;
pub mod filter;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Select, SqlErr};
use uuid::Uuid;

use crate::models::{department as department_model, employee as employee_model};

pub use department::{DepartmentFilter, DepartmentRepository};
pub use employee::{EmployeeFilter, EmployeeRepository};
pub use filter::FilterBuilder;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u64 = 100;

/// One-based page selection for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Row offset of the first item on this page, or `None` when it does not
    /// fit the signed 64-bit OFFSET databases accept
    pub fn offset(&self) -> Option<u64> {
        self.page
            .saturating_sub(1)
            .checked_mul(self.page_size)
            .filter(|offset| *offset <= i64::MAX as u64)
    }
}

/// A (possibly paged) slice of rows plus the number of rows the filter matched
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

/// Persistence operations for employees
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Inserts a new row and returns the number of rows affected
    async fn add(&self, employee: employee_model::Model) -> Result<u64, DbErr>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<employee_model::Model>, DbErr>;

    async fn get_by_cpf(&self, cpf: &str) -> Result<Option<employee_model::Model>, DbErr>;

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<employee_model::Model>, DbErr>;

    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: Option<PageRequest>,
    ) -> Result<Listing<employee_model::Model>, DbErr>;

    async fn update(&self, employee: employee_model::Model)
    -> Result<employee_model::Model, DbErr>;

    /// Returns `true` when a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DbErr>;
}

/// Persistence operations for departments
#[async_trait]
pub trait DepartmentStore: Send + Sync {
    /// Inserts a new row and returns the number of rows affected
    async fn add(&self, department: department_model::Model) -> Result<u64, DbErr>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<department_model::Model>, DbErr>;

    /// Exact (case-sensitive) name lookup
    async fn get_by_name(&self, name: &str) -> Result<Option<department_model::Model>, DbErr>;

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<department_model::Model>, DbErr>;

    async fn list(
        &self,
        filter: &DepartmentFilter,
        page: Option<PageRequest>,
    ) -> Result<Listing<department_model::Model>, DbErr>;

    async fn update(&self, department: department_model::Model) -> Result<department_model::Model, DbErr>;

    /// Returns `true` when a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool, DbErr>;
}

/// Runs `select`, counting every matching row and materializing either all of
/// them or just the requested page
pub(crate) async fn fetch_listing<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: Option<PageRequest>,
) -> Result<Listing<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
{
    match page {
        Some(page) => {
            let paginator = select.paginate(db, page.page_size.max(1));
            let total_count = paginator.num_items().await?;
            let items = match page.offset() {
                Some(_) => paginator.fetch_page(page.page.saturating_sub(1)).await?,
                None => Vec::new(),
            };
            Ok(Listing { items, total_count })
        }
        None => {
            let items = select.all(db).await?;
            let total_count = items.len() as u64;
            Ok(Listing { items, total_count })
        }
    }
}

/// Whether the database rejected a write because of a unique index
pub fn is_unique_violation(error: &DbErr) -> bool {
    matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Distinct ids in first-seen order, for batched `IN` lookups
pub(crate) fn distinct_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
