//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

use crate::infra::Schema;

/// Generic data-access layer - schema maintenance tool
#[derive(Parser, Debug)]
#[command(name = "dal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run database migrations
    Migrate(MigrateArgs),

    /// Check that the schema databases are reachable
    Ping(PingArgs),
}

/// Schema selection shared by commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaArg {
    CoreBusiness,
    ErrorsReporting,
    All,
}

impl SchemaArg {
    /// Schemas the selection stands for
    pub fn schemas(self) -> Vec<Schema> {
        match self {
            SchemaArg::CoreBusiness => vec![Schema::CoreBusiness],
            SchemaArg::ErrorsReporting => vec![Schema::ErrorsReporting],
            SchemaArg::All => Schema::ALL.to_vec(),
        }
    }
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Schema to migrate
    #[arg(short, long, value_enum, default_value = "all", global = true)]
    pub schema: SchemaArg,

    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Drop the schema's tables and re-run all migrations
    Fresh,
}

/// Arguments for the ping command
#[derive(Parser, Debug)]
pub struct PingArgs {
    /// Schema to check
    #[arg(short, long, value_enum, default_value = "all")]
    pub schema: SchemaArg,
}
