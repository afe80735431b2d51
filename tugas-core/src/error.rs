//! Core error types for tugas domain logic
//!
//! These errors represent domain-level failures, not I/O or menu errors.

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Format deadline tidak valid: '{0}' (gunakan DD-MM-YYYY, DD-MM-YYYY HH:MM atau DD-MM-YYYY HH:MM:SS)")]
    InvalidDeadlineFormat(String),

    #[error("Pilihan tidak valid: '{input}' (pilih 1-{max})")]
    InvalidSelection { input: String, max: usize },

    #[error("Input tidak valid: {field} - {message}")]
    Validation { field: String, message: String },
}

impl CoreError {
    /// Create an invalid deadline error for the given input
    pub fn invalid_deadline(input: impl Into<String>) -> Self {
        Self::InvalidDeadlineFormat(input.into())
    }

    /// Create an invalid selection error
    pub fn invalid_selection(input: impl Into<String>, max: usize) -> Self {
        Self::InvalidSelection {
            input: input.into(),
            max,
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
