//! Migration to create the employees table.
//!
//! Every employee belongs to exactly one department; the CPF column carries a
//! unique index which is the race-safe backstop for the application-level
//! uniqueness check. `name_search` and `rg_search` hold case-folded copies
//! for substring filters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Employees::NameSearch).text().not_null())
                    .col(ColumnDef::new(Employees::Cpf).string_len(14).not_null())
                    .col(ColumnDef::new(Employees::Rg).string_len(20).null())
                    .col(ColumnDef::new(Employees::RgSearch).text().null())
                    .col(ColumnDef::new(Employees::DepartmentId).uuid().not_null())
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_department_id")
                            .from(Employees::Table, Employees::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_cpf")
                    .table(Employees::Table)
                    .col(Employees::Cpf)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Listing by department is the most common filter
        manager
            .create_index(
                Index::create()
                    .name("idx_employees_department_id")
                    .table(Employees::Table)
                    .col(Employees::DepartmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_employees_department_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_employees_cpf").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    Name,
    NameSearch,
    Cpf,
    Rg,
    RgSearch,
    DepartmentId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}
