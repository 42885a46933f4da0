//! Database migrations for the Employee Management API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2026_02_07_000001_create_departments;
mod m2026_02_07_000002_create_employees;
mod m2026_02_07_000003_add_department_manager_fk;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2026_02_07_000001_create_departments::Migration),
            Box::new(m2026_02_07_000002_create_employees::Migration),
            Box::new(m2026_02_07_000003_add_department_manager_fk::Migration),
        ]
    }
}
