//! Department entity model
//!
//! This module contains the SeaORM entity model for the departments table.
//! Departments form a tree through the nullable parent reference and may be
//! led by a manager who is an employee.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::employee::Entity as Employee;
use super::fold_case;

/// Department entity representing an organizational unit
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    /// Unique identifier for the department (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Department name (unique across all departments)
    pub name: String,

    /// Case-folded copy of `name`, matched by substring filters
    pub name_search: String,

    /// Employee leading the department (optional)
    pub manager_id: Option<Uuid>,

    /// Parent department in the hierarchy (optional self-reference)
    pub parent_department_id: Option<Uuid>,

    /// Timestamp when the department was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentDepartmentId",
        to = "Column::Id"
    )]
    ParentDepartment,
    #[sea_orm(
        belongs_to = "Employee",
        from = "Column::ManagerId",
        to = "super::employee::Column::Id"
    )]
    Manager,
    #[sea_orm(has_many = "Employee")]
    Employees,
}

impl Related<Employee> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Model {
    /// Builds a new department with a fresh id.
    pub fn new(name: String, manager_id: Option<Uuid>, parent_department_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name_search: fold_case(&name),
            name,
            manager_id,
            parent_department_id,
            created_at: chrono::Utc::now().into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, EntityTrait, ModelTrait, QueryFilter, RelationTrait, RelationType};

    #[test]
    fn relations_follow_the_foreign_keys() {
        assert!(matches!(Relation::Employees.def().rel_type, RelationType::HasMany));
        assert!(matches!(Relation::ParentDepartment.def().rel_type, RelationType::HasOne));
        assert!(matches!(Relation::Manager.def().rel_type, RelationType::HasOne));
    }

    #[tokio::test]
    async fn members_and_children_resolve_from_the_department() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let ops = Model::new("Operações".to_string(), None, None);
        let logistics = Model::new("Logistics".to_string(), None, Some(ops.id));
        assert_eq!(ops.name_search, "operações");
        for department in [&ops, &logistics] {
            Entity::insert(ActiveModel::from(department.clone()))
                .exec_without_returning(&db)
                .await
                .unwrap();
        }
        let member =
            employee::Model::new("Ana".to_string(), "11111111111".to_string(), None, ops.id);
        employee::Entity::insert(employee::ActiveModel::from(member.clone()))
            .exec_without_returning(&db)
            .await
            .unwrap();

        let members = ops.find_related(Employee).all(&db).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, member.id);

        let children = Entity::find()
            .filter(Column::ParentDepartmentId.eq(ops.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, logistics.id);
    }
}
