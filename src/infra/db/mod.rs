//! Database connection and initialization.

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    Statement,
};
use sea_orm_migration::{MigrationName, MigratorTrait};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;

pub mod migrations;

pub use migrations::{CoreBusinessMigrator, ErrorsReportingMigrator};

/// Group of tables with its own connection URL and migration history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Catalog (articles, categories) and customers
    CoreBusiness,
    /// Applications and their logged exceptions
    ErrorsReporting,
}

impl Schema {
    pub const ALL: [Schema; 2] = [Schema::CoreBusiness, Schema::ErrorsReporting];

    /// Connection URL of this schema in `config`
    pub fn database_url(self, config: &Config) -> &str {
        match self {
            Schema::CoreBusiness => &config.core_business_database_url,
            Schema::ErrorsReporting => &config.errors_reporting_database_url,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::CoreBusiness => write!(f, "core-business"),
            Schema::ErrorsReporting => write!(f, "errors-reporting"),
        }
    }
}

/// Database wrapper for connection management
///
/// The pool is shared behind an `Arc`, so clones and contexts built from
/// [`Database::get_connection`] use the same connections.
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
    schema: Schema,
}

impl Database {
    /// Connect to `schema`'s database and apply pending migrations.
    pub async fn connect(config: &Config, schema: Schema) -> Result<Self, DbErr> {
        let database = Self::connect_without_migrations(config, schema).await?;
        database.run_migrations().await?;

        tracing::info!(%schema, "Database connected and migrations applied");
        Ok(database)
    }

    /// Connect without running migrations (for CLI commands).
    pub async fn connect_without_migrations(config: &Config, schema: Schema) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(schema.database_url(config).to_string());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .sqlx_logging(config.sql_logging);

        let connection = SeaDatabase::connect(options).await?;
        Ok(Self {
            connection: Arc::new(connection),
            schema,
        })
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a shared handle to the database connection.
    pub fn get_connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.connection)
    }

    /// Run pending migrations.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        match self.schema {
            Schema::CoreBusiness => CoreBusinessMigrator::up(self.connection(), None).await,
            Schema::ErrorsReporting => ErrorsReportingMigrator::up(self.connection(), None).await,
        }
    }

    /// Rollback the last migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        match self.schema {
            Schema::CoreBusiness => CoreBusinessMigrator::down(self.connection(), Some(1)).await,
            Schema::ErrorsReporting => {
                ErrorsReportingMigrator::down(self.connection(), Some(1)).await
            }
        }
    }

    /// Get migration status (list all migrations with applied status).
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        match self.schema {
            Schema::CoreBusiness => status_of::<CoreBusinessMigrator>(self.connection()).await,
            Schema::ErrorsReporting => {
                status_of::<ErrorsReportingMigrator>(self.connection()).await
            }
        }
    }

    /// Drop every table of the schema and run all migrations fresh.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        match self.schema {
            Schema::CoreBusiness => {
                CoreBusinessMigrator::reset(self.connection()).await?;
                CoreBusinessMigrator::up(self.connection(), None).await
            }
            Schema::ErrorsReporting => {
                ErrorsReportingMigrator::reset(self.connection()).await?;
                ErrorsReportingMigrator::up(self.connection(), None).await
            }
        }
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}

async fn status_of<M: MigratorTrait>(
    connection: &DatabaseConnection,
) -> Result<Vec<(String, bool)>, DbErr> {
    let pending: HashSet<String> = M::get_pending_migrations(connection)
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();

    Ok(M::migrations()
        .iter()
        .map(|m| {
            let name = m.name().to_string();
            let is_applied = !pending.contains(&name);
            (name, is_applied)
        })
        .collect())
}
