//! Process-wide logger registry and lifecycle management.
//!
//! The registry maps names to logger instances so the whole process reuses
//! (and properly closes) one logger per name. The first lookup lazily
//! creates the root logger with the redaction filter pre-attached.
//!
//! Process hooks are owned by a lifecycle manager and installed exactly
//! once per process lifetime: repeated per-logger close/reset cycles can
//! never accumulate duplicate handlers. [`shutdown`] is the supported
//! controlled-exit path.

use std::collections::HashMap;
use std::panic;
use std::sync::{Arc, Mutex, MutexGuard, Once};

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::level::{Level, LevelSpec};
use crate::logger::{FilterFn, Logger};
use crate::record::Payload;
use crate::stream::LogStream;

/// Name of the lazily-created root logger.
pub const ROOT_LOGGER_NAME: &str = "nimbus";

/// Map from logger name to instance; first registration wins.
#[derive(Default)]
pub struct LoggerRegistry {
    loggers: HashMap<String, Logger>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        LoggerRegistry::default()
    }

    /// Register a logger under `name`. A name already present keeps its
    /// original instance.
    pub fn register(&mut self, logger: Logger, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::NameRequired);
        }
        self.loggers.entry(name.to_string()).or_insert(logger);
        Ok(())
    }

    /// Look up a logger by name.
    ///
    /// When the registry is empty and creation is allowed, the root logger
    /// is created first: level error, no streams yet, the redaction filter
    /// pre-attached. A name still absent afterwards is an error.
    pub fn lookup(&mut self, name: &str, create_root_if_missing: bool) -> Result<Logger> {
        if name.is_empty() {
            return Err(Error::NameRequired);
        }

        if self.loggers.is_empty() && create_root_if_missing {
            let root = Logger::new(ROOT_LOGGER_NAME)?;
            root.set_level(Some(LevelSpec::from(Level::Error.name())))?;
            root.add_filter(redaction_filter());
            self.register(root.clone(), ROOT_LOGGER_NAME)?;
            root.trace(format!("Setup '{name}' logger instance"));
        }

        self.loggers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::LoggerNotFound {
                name: name.to_string(),
            })
    }

    /// Close every registered logger, passing the optional per-stream hook
    /// through to each close.
    pub fn close_all(&mut self, mut hook: Option<&mut dyn FnMut(&LogStream)>) {
        for logger in self.loggers.values() {
            match hook.as_mut() {
                Some(hook) => logger.close(Some(&mut **hook)),
                None => logger.close(None),
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

/// The filter pre-attached to the root logger (and inherited by children):
/// masks every secret-bearing key before a record reaches a stream.
pub fn redaction_filter() -> FilterFn {
    Arc::new(|payload: Payload| Payload {
        message: nb_redact::redact_text(&payload.message),
        fields: payload
            .fields
            .into_iter()
            .map(nb_redact::redact_value)
            .collect(),
    })
}

static REGISTRY: Lazy<Mutex<LoggerRegistry>> = Lazy::new(|| Mutex::new(LoggerRegistry::new()));

fn registry() -> MutexGuard<'static, LoggerRegistry> {
    REGISTRY
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Look up a logger in the process-wide registry, lazily creating the root
/// on first access.
pub fn lookup(name: &str) -> Result<Logger> {
    registry().lookup(name, true)
}

/// Look up without creating the root. Used by paths that must tolerate a
/// partially-initialized process.
pub fn try_lookup(name: &str) -> Result<Logger> {
    registry().lookup(name, false)
}

/// The root logger for this process.
pub fn root_logger() -> Result<Logger> {
    lookup(ROOT_LOGGER_NAME)
}

/// Register a logger in the process-wide registry (first registration
/// wins).
pub fn register(logger: Logger, name: &str) -> Result<()> {
    registry().register(logger, name)
}

/// Flush and close every registered logger. The supported controlled-exit
/// path; safe to call more than once.
pub fn shutdown(hook: Option<&mut dyn FnMut(&LogStream)>) {
    registry().close_all(hook);
}

static PROCESS_HOOKS: Once = Once::new();

/// Install the process-level panic hook, exactly once per process
/// lifetime.
///
/// The hook logs the panic at FATAL through the root logger — tolerating
/// an absent or partially-initialized registry — then flushes every
/// registered logger before delegating to the previous hook. It must
/// never panic itself.
pub(crate) fn install_process_hooks() {
    PROCESS_HOOKS.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if let Ok(root) = try_lookup(ROOT_LOGGER_NAME) {
                root.fatal(info.to_string());
            }
            shutdown(None);
            previous(info);
        }));
    });
}
