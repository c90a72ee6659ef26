//! Migration to create the settings table (singleton company settings).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Settings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Settings::CompanyName).text().not_null())
                    .col(ColumnDef::new(Settings::CompanyAddress).text().not_null())
                    .col(ColumnDef::new(Settings::CompanyPhone).text().not_null())
                    .col(ColumnDef::new(Settings::CompanyEmail).text().not_null())
                    .col(
                        ColumnDef::new(Settings::DefaultVat)
                            .double()
                            .not_null()
                            .default(15.0),
                    )
                    .col(ColumnDef::new(Settings::CheckerSignature).text().null())
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Settings::UpdatedBy).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settings_updated_by")
                            .from(Settings::Table, Settings::UpdatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    CompanyName,
    CompanyAddress,
    CompanyPhone,
    CompanyEmail,
    DefaultVat,
    CheckerSignature,
    UpdatedAt,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
