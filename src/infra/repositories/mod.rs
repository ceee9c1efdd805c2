//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! One [`GenericRepository`] serves every [`Record`]; specific repositories
//! add named queries on top of it.

mod article_repository;
mod category_repository;
mod customer_repository;
pub mod entities;
mod generic;
mod query;
mod record;

pub use article_repository::{ArticleRepository, ArticlesRepository};
pub use category_repository::{CategoriesRepository, CategoryRepository};
pub use customer_repository::{CustomerRepository, CustomersRepository};
pub use generic::{GenericRepository, Repository};
pub use query::Query;
pub use record::{unknown_navigation, Record};

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use generic::MockRepository;
