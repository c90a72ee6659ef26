//! Database migrations for the price-comparison service.
//!
//! One migration per table, applied in dependency order.

pub use sea_orm_migration::prelude::*;

mod m2025_01_10_000001_create_users;
mod m2025_01_10_000002_create_vendors;
mod m2025_01_10_000003_create_items;
mod m2025_01_10_000004_create_comparisons;
mod m2025_01_10_000005_create_comparison_rows;
mod m2025_01_10_000006_create_comparison_vendors;
mod m2025_01_10_000007_create_attachments;
mod m2025_01_10_000008_create_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_10_000001_create_users::Migration),
            Box::new(m2025_01_10_000002_create_vendors::Migration),
            Box::new(m2025_01_10_000003_create_items::Migration),
            Box::new(m2025_01_10_000004_create_comparisons::Migration),
            Box::new(m2025_01_10_000005_create_comparison_rows::Migration),
            Box::new(m2025_01_10_000006_create_comparison_vendors::Migration),
            Box::new(m2025_01_10_000007_create_attachments::Migration),
            Box::new(m2025_01_10_000008_create_settings::Migration),
        ]
    }
}
