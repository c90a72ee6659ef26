//! Migration to create the comparisons table.
//!
//! Creator and reviewer reference users with restrict semantics so that a
//! user with comparison history cannot be removed out from under it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comparisons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comparisons::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comparisons::RequestNumber).text().not_null())
                    .col(ColumnDef::new(Comparisons::Title).text().not_null())
                    .col(
                        ColumnDef::new(Comparisons::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Comparisons::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Comparisons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Comparisons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Comparisons::SubmittedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Comparisons::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Comparisons::ReviewedBy).uuid().null())
                    .col(ColumnDef::new(Comparisons::RejectionReason).text().null())
                    .col(
                        ColumnDef::new(Comparisons::GeneralComments)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Comparisons::Purpose)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comparisons_created_by")
                            .from(Comparisons::Table, Comparisons::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comparisons_reviewed_by")
                            .from(Comparisons::Table, Comparisons::ReviewedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comparisons_created_by")
                    .table(Comparisons::Table)
                    .col(Comparisons::CreatedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_comparisons_created_by").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Comparisons::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Comparisons {
    Table,
    Id,
    RequestNumber,
    Title,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    SubmittedAt,
    ReviewedAt,
    ReviewedBy,
    RejectionReason,
    GeneralComments,
    Purpose,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
