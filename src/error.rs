//! Application error types for tugas
//!
//! These errors wrap core errors and add I/O, storage and
//! configuration variants.

use thiserror::Error;

/// Application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Kesalahan konfigurasi: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Kesalahan IO: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Kesalahan parsing: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Kesalahan penyimpanan: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Format deadline tidak valid: '{0}' (gunakan DD-MM-YYYY, DD-MM-YYYY HH:MM atau DD-MM-YYYY HH:MM:SS)")]
    InvalidDeadlineFormat(String),

    #[error("Pilihan tidak valid: '{input}' (pilih 1-{max})")]
    InvalidSelection { input: String, max: usize },

    #[error("Input tidak valid: {field} - {message}")]
    Validation { field: String, message: String },

    /// Standard input was closed
    #[error("Input berakhir")]
    InputClosed,
}

impl AppError {
    /// Create a config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error with source
    pub fn parse_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage error with source
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid selection error
    pub fn invalid_selection(input: impl Into<String>, max: usize) -> Self {
        Self::InvalidSelection {
            input: input.into(),
            max,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            context: "operasi IO gagal".to_string(),
            source: err,
        }
    }
}

impl From<confy::ConfyError> for AppError {
    fn from(err: confy::ConfyError) -> Self {
        Self::config_with_source("gagal memuat konfigurasi", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse_with_source("gagal membaca JSON", err)
    }
}

impl From<tugas_core::CoreError> for AppError {
    fn from(err: tugas_core::CoreError) -> Self {
        match err {
            tugas_core::CoreError::InvalidDeadlineFormat(input) => {
                Self::InvalidDeadlineFormat(input)
            }
            tugas_core::CoreError::InvalidSelection { input, max } => {
                Self::InvalidSelection { input, max }
            }
            tugas_core::CoreError::Validation { field, message } => {
                Self::Validation { field, message }
            }
        }
    }
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;
