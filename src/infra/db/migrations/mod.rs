//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}
//!
//! The two schemas have their own migrator and history table, so they can
//! share one database or live in separate ones.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_core_business_tables;
mod m20240101_000002_create_errors_reporting_tables;

/// Catalog and customer tables
pub struct CoreBusinessMigrator;

#[async_trait::async_trait]
impl MigratorTrait for CoreBusinessMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_core_business_tables::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_core_business").into_iden()
    }
}

/// Error report tables
pub struct ErrorsReportingMigrator;

#[async_trait::async_trait]
impl MigratorTrait for ErrorsReportingMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000002_create_errors_reporting_tables::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_errors_reporting").into_iden()
    }
}
