//! Migration: Create error report applications and exceptions tables.

use sea_orm::{EntityName, Schema};
use sea_orm_migration::prelude::*;

use crate::infra::repositories::entities::{error_report_application, error_report_exception};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(
                schema
                    .create_table_from_entity(error_report_application::Entity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One row per application release
        manager
            .create_index(
                Index::create()
                    .name("idx_error_report_applications_name_version")
                    .table(error_report_application::Entity)
                    .col(error_report_application::Column::Name)
                    .col(error_report_application::Column::Version)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(error_report_exception::Entity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_error_report_exceptions_id_application")
                    .table(error_report_exception::Entity)
                    .col(error_report_exception::Column::IdApplication)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            error_report_exception::Entity.table_ref(),
            error_report_application::Entity.table_ref(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
