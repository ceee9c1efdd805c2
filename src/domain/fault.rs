//! Fault value object - a reportable error with its chain of causes.
//!
//! Faults are what the errors reporting service persists. They are usually
//! built from any `std::error::Error` through its `source()` chain.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::panic::Location;

use crate::config::MAX_CAUSE_DEPTH;

/// Place in the code where a fault was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Module (source file) of the call site, when known
    pub module: Option<String>,
    pub name: String,
}

impl CallSite {
    /// Call site of the caller of the annotated function
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            module: Some(location.file().to_string()),
            name: format!("{}:{}", location.line(), location.column()),
        }
    }
}

/// Reportable error with an optional cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub kind: String,
    pub message: String,
    /// Component that raised the fault
    pub source: Option<String>,
    pub site: Option<CallSite>,
    pub stack_trace: Option<String>,
    pub help_link: Option<String>,
    pub cause: Option<Box<Fault>>,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
            site: None,
            stack_trace: None,
            help_link: None,
            cause: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_site(mut self, site: CallSite) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    pub fn with_help_link(mut self, help_link: impl Into<String>) -> Self {
        self.help_link = Some(help_link.into());
        self
    }

    pub fn caused_by(mut self, cause: Fault) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Capture an error and its `source()` chain.
    ///
    /// The top-level kind is the Rust type name; causes only expose
    /// `dyn Error`, so their kind is read from their `Debug` rendering.
    /// At most `MAX_CAUSE_DEPTH` levels are captured.
    #[track_caller]
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        let top = Self::new(std::any::type_name::<E>(), err.to_string());
        Self::capture(top, err.source())
    }

    /// Capture a type-erased error and its `source()` chain.
    #[track_caller]
    pub fn from_dyn(err: &(dyn Error + 'static)) -> Self {
        let top = Self::new(debug_kind(err), err.to_string());
        Self::capture(top, err.source())
    }

    #[track_caller]
    fn capture(top: Fault, mut next: Option<&(dyn Error + 'static)>) -> Self {
        let backtrace = Backtrace::capture();
        let mut top = top.with_site(CallSite::caller());
        if backtrace.status() == BacktraceStatus::Captured {
            top.stack_trace = Some(backtrace.to_string());
        }

        let mut causes = Vec::new();
        while let Some(err) = next {
            if causes.len() + 1 >= MAX_CAUSE_DEPTH {
                tracing::warn!(depth = MAX_CAUSE_DEPTH, "Cause chain truncated");
                break;
            }
            causes.push(Self::new(debug_kind(err), err.to_string()));
            next = err.source();
        }

        let cause = causes.into_iter().rev().fold(None, |inner, mut fault: Fault| {
            fault.cause = inner.map(Box::new);
            Some(fault)
        });
        top.cause = cause.map(Box::new);
        top
    }

    /// Faults from this one down to the innermost cause.
    pub fn chain(&self) -> impl Iterator<Item = &Fault> {
        std::iter::successors(Some(self), |fault| fault.cause.as_deref())
    }

    /// Number of faults in the chain, this one included
    pub fn depth(&self) -> usize {
        self.chain().count()
    }
}

/// Leading identifier of an error's `Debug` rendering.
fn debug_kind(err: &(dyn Error + 'static)) -> String {
    let rendered = format!("{:?}", err);
    let kind: String = rendered
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if kind.is_empty() {
        "Error".to_string()
    } else {
        kind
    }
}
