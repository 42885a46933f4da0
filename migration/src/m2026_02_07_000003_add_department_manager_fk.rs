//! Adds the departments.manager_id -> employees.id foreign key.
//!
//! SQLite cannot add constraints to an existing table, so on SQLite the
//! manager reference is only enforced by the application validators.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

const FK_NAME: &str = "fk_departments_manager_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() == DatabaseBackend::Sqlite {
            return Ok(());
        }

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name(FK_NAME)
                    .from(Departments::Table, Departments::ManagerId)
                    .to(Employees::Table, Employees::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() == DatabaseBackend::Sqlite {
            return Ok(());
        }

        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name(FK_NAME)
                    .table(Departments::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    ManagerId,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
}
