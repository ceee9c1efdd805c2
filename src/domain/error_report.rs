//! Errors reporting domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Fault, RowVersion};

/// Application whose faults are reported, identified by name and version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ErrorReportApplication {
    pub id: i32,
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub version: String,
    pub first_run_date: DateTime<Utc>,
    pub row_version: RowVersion,
    /// Loaded only when the `exceptions` navigation is included
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<ErrorReportException>,
}

impl ErrorReportApplication {
    /// Create a new application record first run now
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            version: version.into(),
            first_run_date: Utc::now(),
            row_version: RowVersion::empty(),
            exceptions: Vec::new(),
        }
    }
}

/// One logged fault; causes are separate rows linked by `id_inner_exception`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ErrorReportException {
    pub id: i32,
    pub id_application: i32,
    #[validate(length(min = 1, max = 512))]
    pub kind: String,
    pub message: String,
    pub source: Option<String>,
    pub site_module: Option<String>,
    pub site_name: Option<String>,
    pub stack_trace: Option<String>,
    pub help_link: Option<String>,
    pub date: DateTime<Utc>,
    pub id_inner_exception: Option<i32>,
    pub row_version: RowVersion,
    /// Loaded only when the `application` navigation is included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ErrorReportApplication>,
}

impl ErrorReportException {
    /// Row describing `fault` alone; its cause is referenced by `inner`.
    pub fn from_fault(id_application: i32, fault: &Fault, inner: Option<i32>) -> Self {
        let (site_module, site_name) = match &fault.site {
            Some(site) => (site.module.clone(), Some(site.name.clone())),
            None => (None, None),
        };

        Self {
            id: 0,
            id_application,
            kind: fault.kind.clone(),
            message: fault.message.clone(),
            source: fault.source.clone(),
            site_module,
            site_name,
            stack_trace: fault.stack_trace.clone(),
            help_link: fault.help_link.clone(),
            date: Utc::now(),
            id_inner_exception: inner,
            row_version: RowVersion::empty(),
            application: None,
        }
    }
}
