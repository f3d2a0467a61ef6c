//! Structured, filtered logging for the nimbus CLI.
//!
//! Every record is gated by level, run through a redaction filter chain
//! (see `nb-redact`), and fanned out to an append-mode log file and/or a
//! bounded in-memory ring buffer. Human-consumable mode additionally
//! renders output to the console with color and styling; machine mode
//! keeps the console JSON-only.
//!
//! Loggers are handles: clones share state, children share their parent's
//! stream set, and the process-wide registry hands back the same instance
//! for repeated lookups of one name. Process hooks (panic logging, final
//! flush) are installed once per process by the lifecycle manager in
//! [`registry`]; call [`registry::shutdown`] at controlled exit points.
//!
//! # Example
//!
//! ```no_run
//! use nb_log::{registry, LevelSpec};
//!
//! let log = registry::root_logger()?;
//! log.initialize(Some(LevelSpec::from("warn")), None)?;
//!
//! log.warn("org expires in 3 days");
//! registry::shutdown(None);
//! # Ok::<(), nb_log::Error>(())
//! ```

pub mod color;
pub mod context;
pub mod error;
pub mod level;
pub mod logger;
pub mod mode;
pub mod record;
pub mod registry;
pub mod render;
pub mod stream;

pub use color::{strip_color, ColorPalette};
pub use context::CommandContext;
pub use error::{Error, Result};
pub use level::{Level, LevelSpec, DEFAULT_LEVEL};
pub use logger::{
    default_log_path, Deprecation, FilterFn, Logger, LoggerState, RemedialAction,
    DEFAULT_LOG_FILE, EOL,
};
pub use mode::Mode;
pub use record::{LogRecord, Payload};
pub use registry::{
    lookup, redaction_filter, register, root_logger, shutdown, LoggerRegistry, ROOT_LOGGER_NAME,
};
pub use render::{Column, ConsoleRenderer, Renderer};
pub use stream::{LogStream, RecordWriter, RingBuffer, RING_BUFFER_LIMIT};
