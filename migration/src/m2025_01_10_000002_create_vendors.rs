//! Migration to create the vendors table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vendors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Vendors::Name).text().not_null())
                    .col(ColumnDef::new(Vendors::ContactPerson).text().not_null())
                    .col(ColumnDef::new(Vendors::Email).text().not_null())
                    .col(ColumnDef::new(Vendors::Phone).text().not_null())
                    .col(ColumnDef::new(Vendors::Address).text().not_null())
                    .col(
                        ColumnDef::new(Vendors::Vat)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Vendors::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Vendors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
    Name,
    ContactPerson,
    Email,
    Phone,
    Address,
    Vat,
    IsActive,
    CreatedAt,
}
