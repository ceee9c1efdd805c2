//! Migrate command - Database migration management.

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    for schema in args.schema.schemas() {
        tracing::info!(%schema, "Running migration command...");

        // Connect without auto-running migrations for manual control
        let db = Database::connect_without_migrations(&config, schema)
            .await
            .map_err(|e| AppError::ConnectionFailure(format!("{}: {}", schema, e)))?;

        match args.action {
            MigrateAction::Up => {
                tracing::info!(%schema, "Running pending migrations...");
                db.run_migrations().await?;
                tracing::info!(%schema, "Migrations completed successfully");
            }
            MigrateAction::Down => {
                tracing::info!(%schema, "Rolling back last migration...");
                db.rollback_migration().await?;
                tracing::info!(%schema, "Rollback completed successfully");
            }
            MigrateAction::Status => {
                for (name, applied) in db.migration_status().await? {
                    let status_str = if applied { "applied" } else { "pending" };
                    println!("[{}] {}: {}", schema, name, status_str);
                }
            }
            MigrateAction::Fresh => {
                tracing::warn!(%schema, "Dropping tables and running all migrations...");
                db.fresh_migrations().await?;
                tracing::info!(%schema, "Fresh migrations completed successfully");
            }
        }
    }

    Ok(())
}
