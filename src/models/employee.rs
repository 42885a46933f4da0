//! Employee entity model
//!
//! This module contains the SeaORM entity model for the employees table.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::department::Entity as Department;
use super::fold_case;

/// Employee entity; every employee belongs to exactly one department
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Full name
    pub name: String,

    /// Case-folded copy of `name`, matched by substring filters
    pub name_search: String,

    /// National tax id (CPF), unique across employees
    pub cpf: String,

    /// Secondary identity document (RG)
    pub rg: Option<String>,

    /// Case-folded copy of `rg`
    pub rg_search: Option<String>,

    /// Owning department
    pub department_id: Uuid,

    /// Timestamp when the employee was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Department",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl Related<Department> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Model {
    /// Builds a new employee with a fresh id, keeping the search columns in step.
    pub fn new(name: String, cpf: String, rg: Option<String>, department_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name_search: fold_case(&name),
            name,
            cpf,
            rg_search: rg.as_deref().map(fold_case),
            rg,
            department_id,
            created_at: chrono::Utc::now().into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
