//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Each module also binds its domain record to the entity through
//! [`Record`](super::Record).

pub mod article;
pub mod category;
pub mod customer;
pub mod error_report_application;
pub mod error_report_exception;

// Re-exports for public API convenience
#[allow(unused_imports)]
pub use article::{Column as ArticleColumn, Entity as ArticleEntity};
#[allow(unused_imports)]
pub use category::{Column as CategoryColumn, Entity as CategoryEntity};
#[allow(unused_imports)]
pub use customer::{Column as CustomerColumn, Entity as CustomerEntity};
#[allow(unused_imports)]
pub use error_report_application::{
    Column as ErrorReportApplicationColumn, Entity as ErrorReportApplicationEntity,
};
#[allow(unused_imports)]
pub use error_report_exception::{
    Column as ErrorReportExceptionColumn, Entity as ErrorReportExceptionEntity,
};
