//! Failure reporting hook for lookups.

use crate::error::Error;

/// Receives a failed lookup before its error is returned.
///
/// The method cannot fail, so reporting never replaces the original error.
pub trait DiagnosticLogger: Send + Sync {
    /// Report `err`; `description` names the call that failed.
    fn error(&self, err: &Error, description: &str);
}

impl<F> DiagnosticLogger for F
where
    F: Fn(&Error, &str) + Send + Sync,
{
    fn error(&self, err: &Error, description: &str) {
        self(err, description)
    }
}

/// Forwards reports to the `log` facade at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticLogger for LogDiagnostics {
    fn error(&self, err: &Error, description: &str) {
        log::error!("{}: {}", description, err);
    }
}
