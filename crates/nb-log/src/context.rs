//! Command execution context and process environment toggles.

use std::env;

/// Disables file-log creation entirely when set to `true`.
pub const DISABLE_LOG_FILE_ENV: &str = "NIMBUS_DISABLE_LOG_FILE";

/// Controls whether JSON output also goes to stdout. Defaults to true.
pub const JSON_TO_STDOUT_ENV: &str = "NIMBUS_JSON_TO_STDOUT";

/// Names the run mode (production, development, demo).
pub const ENV_MODE_ENV: &str = "NIMBUS_ENV";

/// True when file-log creation is disabled for this process.
pub fn file_logging_disabled() -> bool {
    env::var(DISABLE_LOG_FILE_ENV)
        .map(|value| value == "true")
        .unwrap_or(false)
}

/// Whether JSON output rides on stdout. Unset means true.
pub fn json_to_stdout() -> bool {
    match env::var(JSON_TO_STDOUT_ENV) {
        Ok(value) => !matches!(value.to_ascii_lowercase().as_str(), "false" | "0"),
        Err(_) => true,
    }
}

/// Per-command state surfaced to [`Logger::warn_user`].
///
/// [`Logger::warn_user`]: crate::logger::Logger::warn_user
#[derive(Debug, Default, Clone)]
pub struct CommandContext {
    /// The command was invoked with JSON output requested.
    pub json: bool,
    /// Warnings accumulated for the JSON envelope.
    pub warnings: Vec<String>,
}

impl CommandContext {
    pub fn new(json: bool) -> Self {
        CommandContext {
            json,
            warnings: Vec::new(),
        }
    }
}
