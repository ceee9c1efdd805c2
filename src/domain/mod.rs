//! Domain layer - Core business entities and logic
//!
//! This module contains the records persisted by the data-access layer,
//! independent of how they are mapped to tables.
//!
//! DDD: Domain layer has no persistence logic. The only type borrowed from
//! the ORM is `Decimal` for prices.
//! Contains: Entities, Value Objects.

pub mod catalog;
pub mod customer;
pub mod error_report;
pub mod fault;
pub mod row_version;

pub use catalog::{Article, Category};
pub use customer::Customer;
pub use error_report::{ErrorReportApplication, ErrorReportException};
pub use fault::{CallSite, Fault};
pub use row_version::RowVersion;
