//! Error types and exit codes for mnemos
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (I/O, serialization)
//! - 2: Usage error (bad flags/args, invalid record draft)
//! - 3: Data/store error (missing store, corrupt record, invariant violation)
//! - 4: Retryable contention (store lock timed out)

mod macros;

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes for the mnemos CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args or invalid input (2)
    Usage = 2,
    /// Data/store error - missing store, corrupt data, invariant violation (3)
    Data = 3,
    /// Lock contention - safe to retry (4)
    Retry = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during mnemos operations
#[derive(Error, Debug)]
pub enum MnemosError {
    // Usage errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // Data/store errors (exit code 3)
    #[error("store not found at {path:?}")]
    StoreNotFound { path: PathBuf },

    #[error("invalid store: {reason}")]
    InvalidStore { reason: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("corrupt record at line {line}: {reason}")]
    CorruptRecord { line: usize, reason: String },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    // Contention (exit code 4)
    #[error("timed out after {waited_ms}ms waiting for store lock {path:?}")]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl MnemosError {
    /// Create a validation error for a record draft field
    pub fn validation(field: &str, reason: impl std::fmt::Display) -> Self {
        MnemosError::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        MnemosError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        MnemosError::InvariantViolation(message.into())
    }

    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        MnemosError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Whether the caller may retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, MnemosError::LockTimeout { .. })
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            MnemosError::UsageError(_)
            | MnemosError::Validation { .. } => ExitCode::Usage,

            MnemosError::StoreNotFound { .. }
            | MnemosError::InvalidStore { .. }
            | MnemosError::NotFound { .. }
            | MnemosError::CorruptRecord { .. }
            | MnemosError::InvariantViolation(_) => ExitCode::Data,

            MnemosError::LockTimeout { .. } => ExitCode::Retry,

            MnemosError::Io(_)
            | MnemosError::Json(_)
            | MnemosError::Toml(_)
            | MnemosError::TomlSer(_)
            | MnemosError::FailedOperationWithTarget { .. }
            | MnemosError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the stable error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            MnemosError::UsageError(_) => "usage_error",
            MnemosError::Validation { .. } => "validation_error",
            MnemosError::StoreNotFound { .. } => "store_not_found",
            MnemosError::InvalidStore { .. } => "invalid_store",
            MnemosError::NotFound { .. } => "not_found",
            MnemosError::CorruptRecord { .. } => "corrupt_record",
            MnemosError::InvariantViolation(_) => "invariant_violation",
            MnemosError::LockTimeout { .. } => "lock_timeout",
            MnemosError::Io(_) => "io_error",
            MnemosError::Json(_) => "json_error",
            MnemosError::Toml(_) | MnemosError::TomlSer(_) => "toml_error",
            MnemosError::FailedOperationWithTarget { .. } => "io_error",
            MnemosError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
                "retryable": self.is_retryable(),
            }
        })
    }
}

/// Result type alias for mnemos operations
pub type Result<T> = std::result::Result<T, MnemosError>;
