//! Errors reporting service - Persists faults raised by applications.
//!
//! SOLID (SRP): Handles error-report use cases only.
//! DDD: Orchestrates domain operations via Unit of Work.
//!
//! Saves resolve conflicts with `DatabaseWins`: a report row that changed
//! underneath us is never overwritten.

use async_trait::async_trait;
use sea_orm::ColumnTrait;
use std::sync::Arc;

use crate::config::MAX_CAUSE_DEPTH;
use crate::domain::{ErrorReportApplication, ErrorReportException, Fault};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::error_report_application;
use crate::infra::{ConflictPolicy, DbContext, GenericRepository, Query, Repository, UnitOfWork};

/// Errors reporting service trait for dependency injection.
#[async_trait]
pub trait ErrorsReportingService: Send + Sync {
    /// Register an application release, first run now.
    async fn create_application(&self, name: &str, version: &str)
        -> AppResult<ErrorReportApplication>;

    /// Find a registered application release
    async fn get_application(
        &self,
        name: &str,
        version: &str,
    ) -> AppResult<Option<ErrorReportApplication>>;

    /// Persist `fault` and its causes for an application.
    ///
    /// Returns the id of the top-level row, or `None` when there is no fault.
    async fn log_exception(
        &self,
        application_id: i32,
        fault: Option<&Fault>,
    ) -> AppResult<Option<i32>>;
}

/// Concrete implementation of ErrorsReportingService.
pub struct ErrorReporter {
    context: Arc<dyn UnitOfWork>,
    applications: Arc<dyn Repository<ErrorReportApplication>>,
    exceptions: Arc<dyn Repository<ErrorReportException>>,
    policy: ConflictPolicy,
}

impl ErrorReporter {
    pub fn new(
        context: Arc<dyn UnitOfWork>,
        applications: Arc<dyn Repository<ErrorReportApplication>>,
        exceptions: Arc<dyn Repository<ErrorReportException>>,
    ) -> Self {
        Self {
            context,
            applications,
            exceptions,
            policy: ConflictPolicy::DatabaseWins,
        }
    }

    /// Create the service with repositories sharing `context`.
    pub fn from_context(context: Arc<DbContext>) -> Self {
        let applications =
            Arc::new(GenericRepository::<ErrorReportApplication>::new(Arc::clone(&context)));
        let exceptions =
            Arc::new(GenericRepository::<ErrorReportException>::new(Arc::clone(&context)));
        Self::new(context, applications, exceptions)
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Save staged rows; a failed save drops them instead of leaving them
    /// for the next report.
    async fn commit(&self) -> AppResult<u64> {
        let result = self.context.save_changes_with(self.policy).await;
        if let Err(e) = &result {
            tracing::warn!(code = e.code(), "Save failed, staged rows discarded");
            self.context.discard_changes();
        }
        result
    }
}

#[async_trait]
impl ErrorsReportingService for ErrorReporter {
    async fn create_application(
        &self,
        name: &str,
        version: &str,
    ) -> AppResult<ErrorReportApplication> {
        let entry = self
            .applications
            .insert(ErrorReportApplication::new(name, version));
        self.commit().await?;

        let application = entry.current();
        tracing::info!(id = application.id, name, version, "Application registered");
        Ok(application)
    }

    async fn get_application(
        &self,
        name: &str,
        version: &str,
    ) -> AppResult<Option<ErrorReportApplication>> {
        let mut found = self
            .applications
            .get(
                Query::new()
                    .filter(error_report_application::Column::Name.eq(name))
                    .filter(error_report_application::Column::Version.eq(version)),
            )
            .await?;

        if found.len() > 1 {
            return Err(AppError::internal(format!(
                "{} applications registered as {} {}",
                found.len(),
                name,
                version
            )));
        }
        Ok(found.pop())
    }

    async fn log_exception(
        &self,
        application_id: i32,
        fault: Option<&Fault>,
    ) -> AppResult<Option<i32>> {
        let Some(fault) = fault else {
            return Ok(None);
        };

        let chain: Vec<&Fault> = fault.chain().take(MAX_CAUSE_DEPTH).collect();
        if fault.depth() > MAX_CAUSE_DEPTH {
            tracing::warn!(
                depth = fault.depth(),
                kept = MAX_CAUSE_DEPTH,
                "Innermost causes dropped"
            );
        }

        let mut inner = None;
        for fault in chain.into_iter().rev() {
            let entry = self
                .exceptions
                .insert(ErrorReportException::from_fault(application_id, fault, inner));
            self.commit().await?;
            inner = Some(entry.id());
        }

        tracing::info!(application_id, id = ?inner, "Exception logged");
        Ok(inner)
    }
}
