//! Error types for the logging core.

use thiserror::Error;

/// Result type alias for logging operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the logging core.
///
/// All are raised synchronously to the caller; none are retried
/// internally. Filtering never raises: a value that cannot be coerced to
/// text passes through unredacted rather than failing the log call.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty name passed to register, lookup, or child derivation.
    #[error("logger name required")]
    NameRequired,

    /// Lookup of a name absent after conditional root auto-creation.
    #[error("logger {name} not found")]
    LoggerNotFound { name: String },

    /// Unrecognized level name or number; carries the valid names.
    #[error("invalid log level '{given}' - valid levels are {valid}")]
    InvalidLevel { given: String, valid: String },

    /// Content requested from a logger with neither ring buffer nor file.
    #[error("log target is neither a file stream nor a ring buffer")]
    NoLogTarget,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
