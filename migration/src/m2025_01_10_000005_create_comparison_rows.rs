//! Migration to create the comparison_rows table.
//!
//! Rows are owned by their comparison and cascade with it. `quantities` and
//! `prices` are JSON arrays indexed by vendor position minus one.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComparisonRows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComparisonRows::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComparisonRows::ComparisonId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComparisonRows::Srl).integer().not_null())
                    .col(ColumnDef::new(ComparisonRows::ItemId).uuid().not_null())
                    .col(
                        ColumnDef::new(ComparisonRows::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ComparisonRows::Qty)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ComparisonRows::Uom)
                            .string_len(8)
                            .not_null()
                            .default("NOS"),
                    )
                    .col(ColumnDef::new(ComparisonRows::Quantities).json_binary().not_null())
                    .col(ColumnDef::new(ComparisonRows::Prices).json_binary().not_null())
                    .col(
                        ColumnDef::new(ComparisonRows::SelectedVendorIndex)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComparisonRows::Remarks)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ComparisonRows::Comment)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comparison_rows_comparison_id")
                            .from(ComparisonRows::Table, ComparisonRows::ComparisonId)
                            .to(Comparisons::Table, Comparisons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comparison_rows_item_id")
                            .from(ComparisonRows::Table, ComparisonRows::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comparison_rows_comparison_srl")
                    .table(ComparisonRows::Table)
                    .col(ComparisonRows::ComparisonId)
                    .col(ComparisonRows::Srl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_comparison_rows_comparison_srl")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ComparisonRows::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ComparisonRows {
    Table,
    Id,
    ComparisonId,
    Srl,
    ItemId,
    Description,
    Qty,
    Uom,
    Quantities,
    Prices,
    SelectedVendorIndex,
    Remarks,
    Comment,
}

#[derive(DeriveIden)]
enum Comparisons {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
}
