//! Unified error types for the bill containers.
//!
//! Local validation problems, store rejections, session lookups and
//! configuration failures all flow through [`Error`]. Validation failures keep
//! their own enum so they can be reported on the diagnostic channel without
//! being mistaken for transport failures.

use crate::core::form::FormField;
use thiserror::Error;

/// Top-level error type returned by every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Local, recoverable problem with user input. Never reaches the store.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The store rejected a call. The message is surfaced verbatim.
    #[error("{message}")]
    Transport { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a transport error from any message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the validation error if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Validation failures raised by the new-bill flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file selected")]
    MissingFile,

    #[error("Invalid file type {mime_type}. Please select a JPG, JPEG, or PNG file.")]
    InvalidFileType { mime_type: String },

    #[error("File validation failed. Cannot submit the form.")]
    FileValidationFailed,

    #[error("No receipt has been uploaded for this bill")]
    MissingUpload,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("This bill has already been submitted")]
    AlreadySubmitted,

    #[error("Missing required field: {field}")]
    MissingField { field: FormField },

    #[error("Invalid amount: {value:?}")]
    InvalidAmount { value: String },

    #[error("Invalid date: {value:?}")]
    InvalidDate { value: String },

    #[error("Unknown expense type: {value:?}")]
    UnknownExpenseType { value: String },
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
