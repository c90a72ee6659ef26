//! Migration to create the comparison_vendors join table.
//!
//! `position` is 1-based and unique within a comparison.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComparisonVendors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComparisonVendors::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComparisonVendors::ComparisonId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComparisonVendors::VendorId).uuid().not_null())
                    .col(
                        ColumnDef::new(ComparisonVendors::Position)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comparison_vendors_comparison_id")
                            .from(ComparisonVendors::Table, ComparisonVendors::ComparisonId)
                            .to(Comparisons::Table, Comparisons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comparison_vendors_vendor_id")
                            .from(ComparisonVendors::Table, ComparisonVendors::VendorId)
                            .to(Vendors::Table, Vendors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comparison_vendors_comparison_position")
                    .table(ComparisonVendors::Table)
                    .col(ComparisonVendors::ComparisonId)
                    .col(ComparisonVendors::Position)
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
                    .name("idx_comparison_vendors_comparison_position")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ComparisonVendors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ComparisonVendors {
    Table,
    Id,
    ComparisonId,
    VendorId,
    Position,
}

#[derive(DeriveIden)]
enum Comparisons {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
}
