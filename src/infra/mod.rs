//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - Entities and repositories
//! - Unit of Work for change tracking and transactions
//! - Optimistic concurrency conflict resolution

pub mod concurrency;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use concurrency::ConflictPolicy;
pub use db::{CoreBusinessMigrator, Database, ErrorsReportingMigrator, Schema};
pub use repositories::{
    ArticleRepository, ArticlesRepository, CategoriesRepository, CategoryRepository,
    CustomerRepository, CustomersRepository, GenericRepository, Query, Record, Repository,
};
pub use unit_of_work::{ChangeState, DbContext, Entry, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
