//! Ping command - Database connectivity check.

use crate::cli::args::PingArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Execute the ping command
pub async fn execute(args: PingArgs, config: Config) -> AppResult<()> {
    for schema in args.schema.schemas() {
        let db = Database::connect_without_migrations(&config, schema)
            .await
            .map_err(|e| AppError::ConnectionFailure(format!("{}: {}", schema, e)))?;
        db.ping().await?;
        println!("[{}] ok", schema);
    }
    Ok(())
}
