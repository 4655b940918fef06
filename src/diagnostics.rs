//! Diagnostic side channel of the containers.
//!
//! Containers report what happened (bill counts, validation failures, upload
//! and submit outcomes) as [`Diagnostic`] events. The default sink forwards
//! them to `tracing`; [`RecordingDiagnostics`] keeps them for assertions.

use crate::errors::ValidationError;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Event reported by a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// Count signal emitted once per successful fetch
    BillsFetched { count: usize },
    /// A bill date could not be humanized and is shown raw
    DateFormatFallback {
        bill_id: Option<String>,
        date: String,
    },
    ValidationFailed(ValidationError),
    FileUploaded { file_url: String, key: String },
    UploadFailed { message: String },
    /// A staged upload was removed from the store because it became orphaned
    UploadDiscarded { key: String },
    /// Removing an orphaned upload failed; the record stays in the store
    CompensationFailed { key: String, message: String },
    BillSubmitted,
    SubmitFailed { message: String },
}

/// Sink for diagnostic events.
pub trait Diagnostics: Send + Sync {
    fn report(&self, event: Diagnostic);
}

/// Forwards every event to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, event: Diagnostic) {
        match event {
            Diagnostic::BillsFetched { count } => info!(length = count, "length {count}"),
            Diagnostic::DateFormatFallback { bill_id, date } => {
                warn!(?bill_id, %date, "unparseable bill date, showing raw value");
            }
            Diagnostic::ValidationFailed(e) => error!("{e}"),
            Diagnostic::FileUploaded { file_url, key } => {
                info!(%key, "File uploaded successfully: {file_url}");
            }
            Diagnostic::UploadFailed { message } => error!("Error uploading file: {message}"),
            Diagnostic::UploadDiscarded { key } => debug!(%key, "discarded orphaned upload"),
            Diagnostic::CompensationFailed { key, message } => {
                error!(%key, "Could not discard orphaned upload: {message}");
            }
            Diagnostic::BillSubmitted => info!("Bill submitted"),
            Diagnostic::SubmitFailed { message } => error!("Error creating bill: {message}"),
        }
    }
}

/// Keeps every event in memory, optionally forwarding to `tracing` as well.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events reported so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Counts carried by `BillsFetched` events.
    #[must_use]
    pub fn fetched_counts(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Diagnostic::BillsFetched { count } => Some(count),
                _ => None,
            })
            .collect()
    }

    /// Validation errors reported so far.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Diagnostic::ValidationFailed(e) => Some(e),
                _ => None,
            })
            .collect()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, event: Diagnostic) {
        TracingDiagnostics.report(event.clone());
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_diagnostics_filters() {
        let diagnostics = RecordingDiagnostics::new();
        diagnostics.report(Diagnostic::BillsFetched { count: 4 });
        diagnostics.report(Diagnostic::ValidationFailed(ValidationError::MissingFile));
        diagnostics.report(Diagnostic::BillsFetched { count: 0 });

        assert_eq!(diagnostics.fetched_counts(), [4, 0]);
        assert_eq!(
            diagnostics.validation_errors(),
            [ValidationError::MissingFile]
        );
        assert_eq!(diagnostics.events().len(), 3);
    }
}
