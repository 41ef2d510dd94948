//! Fault reporting to an external collaborator
//!
//! Reporting is fire-and-forget: a reporter cannot return an error, and
//! [`report_best_effort`] contains a reporter that panics so the caller never
//! observes it.

use serde::Serialize;
use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

/// Receiver of fault reports (crash monitor, log sink, test probe)
pub trait FaultReporter: Send + Sync {
    /// Report one fault raised by `component` while performing `operation`
    fn report(&self, error: &(dyn StdError + 'static), component: &str, operation: &str);
}

/// Call `reporter`, swallowing any panic it raises
pub fn report_best_effort(
    reporter: &dyn FaultReporter,
    error: &(dyn StdError + 'static),
    component: &str,
    operation: &str,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        reporter.report(error, component, operation);
    }));
    if outcome.is_err() {
        tracing::warn!(component, operation, "Fault reporter panicked; report dropped");
    }
}

/// Reports faults as `error`-level tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultReporter;

impl FaultReporter for TracingFaultReporter {
    fn report(&self, error: &(dyn StdError + 'static), component: &str, operation: &str) {
        tracing::error!(
            session_id = %crate::session_id(),
            component,
            operation,
            error = %error,
            "Fault reported"
        );
    }
}

/// One captured fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultRecord {
    pub component: String,
    pub operation: String,
    pub message: String,
}

/// Keeps reports in memory, for hosts that forward them later and for tests
#[derive(Debug, Default)]
pub struct MemoryFaultReporter {
    records: Mutex<Vec<FaultRecord>>,
}

impl MemoryFaultReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn records(&self) -> Vec<FaultRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FaultReporter for MemoryFaultReporter {
    fn report(&self, error: &(dyn StdError + 'static), component: &str, operation: &str) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(FaultRecord {
                component: component.to_string(),
                operation: operation.to_string(),
                message: error.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "boom")
        }
    }

    impl StdError for Boom {}

    struct PanickingReporter;

    impl FaultReporter for PanickingReporter {
        fn report(&self, _: &(dyn StdError + 'static), _: &str, _: &str) {
            panic!("reporter backend unavailable");
        }
    }

    #[test]
    fn test_memory_reporter_captures() {
        let reporter = MemoryFaultReporter::new();
        report_best_effort(&reporter, &Boom, "search", "match");

        let records = reporter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].component, "search");
        assert_eq!(records[0].operation, "match");
        assert_eq!(records[0].message, "boom");
    }

    #[test]
    fn test_panicking_reporter_is_contained() {
        report_best_effort(&PanickingReporter, &Boom, "search", "init");
    }

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingFaultReporter.report(&Boom, "search", "preprocess");
    }
}
