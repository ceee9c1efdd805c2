//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services save through the Unit of Work with their own
//! conflict policy.

mod errors_reporting_service;
mod user_service;

// Service traits and implementations
pub use errors_reporting_service::{ErrorReporter, ErrorsReportingService};
pub use user_service::{UserManager, UserService};
