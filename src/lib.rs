//! Generic data-access layer over SeaORM
//!
//! A generic repository with filtered, ordered and include-aware queries,
//! change tracking with optimistic concurrency, and services built on it.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Records, row versions and faults
//! - **services**: Errors reporting and customer use cases
//! - **infra**: Entities, repositories, unit of work and migrations
//! - **types**: Shared types (pagination)
//! - **errors**: Centralized error handling
//!
//! # Example
//!
//! ```ignore
//! let db = Database::connect(&config, Schema::CoreBusiness).await?;
//! let context = Arc::new(DbContext::new(db.get_connection()));
//! let articles = ArticlesRepository::new(context.clone());
//!
//! let entry = articles.insert(Article::new(1, "Lamp", "", Decimal::new(45, 0)));
//! context.save_changes().await?;
//! println!("saved as {}", entry.id());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Run migrations for both schemas
//! cargo run -- migrate up
//!
//! # Only the errors reporting schema
//! cargo run -- migrate --schema errors-reporting status
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use domain::{Article, Category, Customer, ErrorReportApplication, ErrorReportException, Fault};
pub use errors::{AppError, AppResult};
pub use infra::{ConflictPolicy, Database, DbContext, Entry, Query, Repository, Schema, UnitOfWork};
