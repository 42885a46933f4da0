//! Department repository for database operations
//!
//! SeaORM-backed [`DepartmentStore`] over the departments table. Filters on a
//! related row's name (manager, parent department) are expressed as
//! `column IN (SELECT id ... WHERE name_search LIKE ...)`, so rows without the
//! relation never match.

use async_trait::async_trait;
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::filter::{FilterBuilder, contains_folded, non_blank};
use super::{DepartmentStore, Listing, PageRequest, fetch_listing};
use crate::models::department::{self, Entity as Department};
use crate::models::employee::{self, Entity as Employee};
use crate::models::fold_case;

/// Optional department list filters; every present value must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentFilter {
    /// Case-insensitive substring of the department name
    pub name: Option<String>,
    /// Case-insensitive substring of the manager's name
    pub manager_name: Option<String>,
    /// Case-insensitive substring of the parent department's name
    pub parent_department_name: Option<String>,
}

impl DepartmentFilter {
    pub fn condition(&self) -> Condition {
        FilterBuilder::new()
            .contains(department::Column::NameSearch, self.name.as_deref())
            .matching(non_blank(self.manager_name.as_deref()), |needle| {
                department::Column::ManagerId.in_subquery(employee_ids_named_like(needle))
            })
            .matching(
                non_blank(self.parent_department_name.as_deref()),
                |needle| {
                    department::Column::ParentDepartmentId
                        .in_subquery(department_ids_named_like(needle))
                },
            )
            .build()
    }
}

fn employee_ids_named_like(needle: &str) -> SelectStatement {
    Query::select()
        .column(employee::Column::Id)
        .from(Employee)
        .and_where(contains_folded(employee::Column::NameSearch, needle))
        .to_owned()
}

fn department_ids_named_like(needle: &str) -> SelectStatement {
    Query::select()
        .column(department::Column::Id)
        .from(Department)
        .and_where(contains_folded(department::Column::NameSearch, needle))
        .to_owned()
}

/// Repository for department database operations
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl DepartmentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DepartmentStore for DepartmentRepository {
    async fn add(&self, department: department::Model) -> Result<u64, DbErr> {
        let active = department::ActiveModel {
            id: Set(department.id),
            name_search: Set(fold_case(&department.name)),
            name: Set(department.name),
            manager_id: Set(department.manager_id),
            parent_department_id: Set(department.parent_department_id),
            created_at: Set(department.created_at),
        };

        Department::insert(active)
            .exec_without_returning(&*self.db)
            .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<department::Model>, DbErr> {
        Department::find_by_id(id).one(&*self.db).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<department::Model>, DbErr> {
        Department::find()
            .filter(department::Column::Name.eq(name))
            .one(&*self.db)
            .await
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<department::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Department::find()
            .filter(department::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await
    }

    async fn list(
        &self,
        filter: &DepartmentFilter,
        page: Option<PageRequest>,
    ) -> Result<Listing<department::Model>, DbErr> {
        let select = Department::find()
            .filter(filter.condition())
            .order_by_asc(department::Column::Name)
            .order_by_asc(department::Column::Id);

        fetch_listing(&self.db, select, page).await
    }

    async fn update(&self, department: department::Model) -> Result<department::Model, DbErr> {
        let mut active = department.clone().into_active_model();
        active.name_search = Set(fold_case(&department.name));
        active.name = Set(department.name);
        active.manager_id = Set(department.manager_id);
        active.parent_department_id = Set(department.parent_department_id);

        active.update(&*self.db).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = Department::delete_by_id(id).exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::sea_query::PostgresQueryBuilder;
    use sea_orm::{Database, QueryTrait};

    async fn setup() -> DepartmentRepository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        DepartmentRepository::new(Arc::new(db))
    }

    fn department(name: &str, parent: Option<Uuid>) -> department::Model {
        department::Model::new(name.to_string(), None, parent)
    }

    async fn add_employee(repo: &DepartmentRepository, name: &str, department_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        employee::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            name_search: Set(fold_case(name)),
            cpf: Set(format!("{:011}", id.as_u128() % 100_000_000_000)),
            rg: Set(None),
            rg_search: Set(None),
            department_id: Set(department_id),
            created_at: Set(Utc::now().into()),
        }
        .insert(&*repo.db)
        .await
        .unwrap();
        id
    }

    #[test]
    fn related_name_filters_use_subqueries() {
        let sql = Department::find()
            .filter(
                DepartmentFilter {
                    manager_name: Some("ana".to_string()),
                    parent_department_name: Some("ops".to_string()),
                    ..Default::default()
                }
                .condition(),
            )
            .into_query()
            .to_string(PostgresQueryBuilder);

        assert!(sql.contains(r#""manager_id" IN (SELECT "id" FROM "employees""#), "{sql}");
        assert!(
            sql.contains(r#""parent_department_id" IN (SELECT "id" FROM "departments""#),
            "{sql}"
        );
        assert_eq!(sql.matches(r#""name_search" LIKE"#).count(), 2, "{sql}");
    }

    #[tokio::test]
    async fn get_by_name_is_exact() {
        let repo = setup().await;
        repo.add(department("Engineering", None)).await.unwrap();

        assert!(repo.get_by_name("Engineering").await.unwrap().is_some());
        assert!(repo.get_by_name("Engineer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_by_manager_and_parent_name() {
        let repo = setup().await;
        let root = department("Operations", None);
        let child = department("Logistics", Some(root.id));
        let other = department("Finance", None);
        repo.add(root.clone()).await.unwrap();
        repo.add(child.clone()).await.unwrap();
        repo.add(other.clone()).await.unwrap();

        let manager_id = add_employee(&repo, "Carla Mendes", other.id).await;
        let mut finance = other.clone();
        finance.manager_id = Some(manager_id);
        repo.update(finance).await.unwrap();

        let by_manager = repo
            .list(
                &DepartmentFilter {
                    manager_name: Some("mendes".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(by_manager.total_count, 1);
        assert_eq!(by_manager.items[0].name, "Finance");

        let by_parent = repo
            .list(
                &DepartmentFilter {
                    parent_department_name: Some("OPER".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(by_parent.total_count, 1);
        assert_eq!(by_parent.items[0].id, child.id);

        let conjunctive = repo
            .list(
                &DepartmentFilter {
                    name: Some("fin".to_string()),
                    parent_department_name: Some("oper".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(conjunctive.total_count, 0);
    }

    #[tokio::test]
    async fn accented_names_match_regardless_of_case() {
        let repo = setup().await;
        let root = department("DIREÇÃO GERAL", None);
        let child = department("Área Técnica", Some(root.id));
        repo.add(root.clone()).await.unwrap();
        repo.add(child.clone()).await.unwrap();

        let manager_id = add_employee(&repo, "ÉRICA NÚÑEZ", root.id).await;
        let mut led = child.clone();
        led.manager_id = Some(manager_id);
        repo.update(led).await.unwrap();

        let filters = [
            DepartmentFilter {
                name: Some("ÁREA".to_string()),
                ..Default::default()
            },
            DepartmentFilter {
                manager_name: Some("érica núñez".to_string()),
                ..Default::default()
            },
            DepartmentFilter {
                parent_department_name: Some("direção".to_string()),
                ..Default::default()
            },
        ];
        for filter in &filters {
            let found = repo.list(filter, None).await.unwrap();
            assert_eq!(found.total_count, 1, "{filter:?}");
            assert_eq!(found.items[0].id, child.id);
        }
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let repo = setup().await;
        let root = department("Operations", None);
        let child = department("Logistics", Some(root.id));
        repo.add(root.clone()).await.unwrap();
        repo.add(child.clone()).await.unwrap();

        assert!(repo.delete(child.id).await.unwrap());
        assert!(!repo.delete(child.id).await.unwrap());
        assert!(repo.get_by_id(child.id).await.unwrap().is_none());

        let remaining = repo
            .list(
                &DepartmentFilter {
                    parent_department_name: Some("operations".to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(remaining.total_count, 0);
    }
}
