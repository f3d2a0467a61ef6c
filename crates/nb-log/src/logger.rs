//! The nimbus logger.
//!
//! A [`Logger`] logs every record at or above its level to an append-mode
//! file or a bounded in-memory ring buffer, after running the record
//! through its redaction filter chain. Human-consumable mode additionally
//! renders output to the console with color and styling; machine mode
//! keeps the console JSON-only.
//!
//! Loggers are handles: clones share state, and a child derived with
//! [`Logger::child`] shares its parent's stream set, so one family writes
//! through one file or ring buffer. Structured fields belong in the
//! payload's field list, not in the message, so the redaction filters see
//! them in canonical form.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::color::ColorPalette;
use crate::context::{self, CommandContext};
use crate::error::{Error, Result};
use crate::level::{Level, LevelSpec, DEFAULT_LEVEL};
use crate::mode::Mode;
use crate::record::{LogRecord, Payload};
use crate::render::{Column, ConsoleRenderer, Renderer};
use crate::stream::{LogStream, RecordWriter, RingBuffer, RING_BUFFER_LIMIT};

/// Filter applied to every payload before it reaches a stream.
pub type FilterFn = Arc<dyn Fn(Payload) -> Payload + Send + Sync>;

/// Default log file name under the nimbus state directory.
pub const DEFAULT_LOG_FILE: &str = "nimbus.log";

/// Directory under the user's home holding nimbus state.
pub const STATE_DIR: &str = ".nimbus";

/// Platform end-of-line marker used when flattening buffered records.
#[cfg(windows)]
pub const EOL: &str = "\r\n";
#[cfg(not(windows))]
pub const EOL: &str = "\n";

/// Default log file path: `<home>/.nimbus/nimbus.log`.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(STATE_DIR)
        .join(DEFAULT_LOG_FILE)
}

/// Stream lifecycle state of a logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerState {
    Uninitialized,
    Initialized,
    Closed,
}

/// A remedial suggestion rendered by [`Logger::action`].
#[derive(Debug, Clone)]
pub struct RemedialAction {
    /// What went wrong.
    pub message: String,
    /// What the user should try.
    pub action: String,
}

/// Deprecation descriptor for [`Logger::format_deprecation_warning`].
#[derive(Debug, Clone, Default)]
pub struct Deprecation {
    /// Major version in which the deprecated item still works.
    pub version: u32,
    /// Replacement to point the user at.
    pub to: Option<String>,
    /// Extra sentence appended to the warning.
    pub message: Option<String>,
    /// Replaces the generated warning entirely.
    pub message_override: Option<String>,
}

struct LoggerInner {
    name: String,
    level: Level,
    state: LoggerState,
    writer: Arc<Mutex<RecordWriter>>,
    filters: Vec<FilterFn>,
    human_consumable: bool,
    color_enabled: bool,
    extra_fields: Map<String, Value>,
    config: Option<Map<String, Value>>,
    log_tag: Option<String>,
    use_ring_buffer: bool,
    ring: Option<Arc<Mutex<RingBuffer>>>,
    path: Option<PathBuf>,
    env_mode: Option<String>,
    command_name: Option<String>,
    renderer: Arc<Mutex<dyn Renderer>>,
}

/// A named, leveled, filtered logger handle. Clones share state.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Mutex<LoggerInner>>,
}

impl Logger {
    /// Create a logger with no attached streams.
    pub fn new(name: impl Into<String>) -> Result<Logger> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::NameRequired);
        }
        Ok(Logger {
            inner: Arc::new(Mutex::new(LoggerInner {
                name,
                level: DEFAULT_LEVEL,
                state: LoggerState::Uninitialized,
                writer: Arc::new(Mutex::new(RecordWriter::new())),
                filters: Vec::new(),
                human_consumable: true,
                color_enabled: false,
                extra_fields: Map::new(),
                config: None,
                log_tag: None,
                use_ring_buffer: false,
                ring: None,
                path: None,
                env_mode: None,
                command_name: None,
                renderer: Arc::new(Mutex::new(ConsoleRenderer)),
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LoggerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_writer(writer: &Arc<Mutex<RecordWriter>>) -> MutexGuard<'_, RecordWriter> {
        writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// True when two handles refer to the same logger.
    pub fn same_as(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // Stream lifecycle
    // ------------------------------------------------------------------

    /// Attach the logger's streams. Idempotent per logger.
    ///
    /// In ring-buffer mode a bounded in-memory stream is attached at
    /// `level` (default warn). Otherwise, unless file logging is disabled
    /// for the process, the log file is created with restrictive
    /// permissions if absent and an append-mode stream is attached;
    /// a duplicate stream for an already-attached path is refused.
    pub fn initialize(&self, level: Option<LevelSpec>, log_file: Option<PathBuf>) -> Result<()> {
        let level = match level {
            Some(spec) => spec.resolve()?,
            None => DEFAULT_LEVEL,
        };

        {
            let mut inner = self.lock();

            if inner.use_ring_buffer {
                if inner.ring.is_none() {
                    let ring = Arc::new(Mutex::new(RingBuffer::new(RING_BUFFER_LIMIT)));
                    inner.ring = Some(ring.clone());
                    let writer_arc = inner.writer.clone();
                    Self::lock_writer(&writer_arc).add_stream(LogStream::memory(ring, level));
                }
            } else if !context::file_logging_disabled() {
                let path = log_file.unwrap_or_else(default_log_path);
                ensure_log_file(&path)?;
                let writer_arc = inner.writer.clone();
                let mut writer = Self::lock_writer(&writer_arc);
                if !writer.has_file_stream(&path) {
                    writer.add_stream(LogStream::file(&path, level)?);
                }
                drop(writer);
                inner.path = Some(path);
            }

            inner.level = level;
            inner.state = LoggerState::Initialized;
        }

        crate::registry::install_process_hooks();
        Ok(())
    }

    /// Flush and close attached streams, invoking the optional per-stream
    /// hook first. Safe to call repeatedly; per-stream failures are
    /// isolated so every stream gets its close attempt.
    pub fn close(&self, hook: Option<&mut dyn FnMut(&LogStream)>) {
        let writer = {
            let mut inner = self.lock();
            inner.state = LoggerState::Closed;
            inner.writer.clone()
        };
        Self::lock_writer(&writer).close(hook);
    }

    /// Close streams, delete backing files, and re-initialize.
    ///
    /// Supports repeatable test runs against a clean log target: the
    /// logger re-attaches to its current target at the default level.
    /// File deletion is best-effort; on Windows a locked log file is
    /// truncated before the delete attempt.
    pub fn reset(&self) -> Result<()> {
        self.close(None);

        let (paths, path) = {
            let mut inner = self.lock();
            let writer_arc = inner.writer.clone();
            let mut writer = Self::lock_writer(&writer_arc);
            let paths = writer.file_paths();
            writer.clear();
            drop(writer);
            inner.ring = None;
            (paths, inner.path.clone())
        };

        for path in paths {
            #[cfg(windows)]
            {
                let _ = fs::write(&path, "");
            }
            let _ = fs::remove_file(&path);
        }

        self.initialize(None, path)
    }

    /// Stream lifecycle state.
    pub fn state(&self) -> LoggerState {
        self.lock().state
    }

    // ------------------------------------------------------------------
    // Level gating
    // ------------------------------------------------------------------

    /// Whether a record at the requested level would pass the gate:
    /// numeric levels compare directly against the current threshold,
    /// named levels are looked up first. Unknown names never pass.
    pub fn should_log(&self, level: impl Into<LevelSpec>) -> bool {
        let threshold = i64::from(self.lock().level.value());
        match level.into() {
            LevelSpec::Numeric(value) => value >= threshold,
            LevelSpec::Named(name) => name
                .parse::<Level>()
                .map(|level| i64::from(level.value()) >= threshold)
                .unwrap_or(false),
        }
    }

    /// Set the level of the logger and every attached stream. Omitting
    /// the level resets it to the default (warn).
    pub fn set_level(&self, level: Option<LevelSpec>) -> Result<()> {
        let level = match level {
            Some(spec) => spec.resolve()?,
            None => DEFAULT_LEVEL,
        };
        let writer = {
            let mut inner = self.lock();
            inner.level = level;
            inner.writer.clone()
        };
        Self::lock_writer(&writer).set_level(level);
        Ok(())
    }

    /// The current level.
    pub fn level(&self) -> Level {
        self.lock().level
    }

    /// Name for a numeric level value, or the current level's name.
    pub fn level_name(&self, value: Option<i64>) -> Option<&'static str> {
        match value {
            Some(value) => Level::from_value(value).map(Level::name),
            None => Some(self.lock().level.name()),
        }
    }

    /// True when DEBUG records currently pass the gate.
    pub fn is_debug_enabled(&self) -> bool {
        self.should_log(LevelSpec::from(Level::Debug))
    }

    /// True when the current level is exactly ERROR.
    pub fn is_error_level(&self) -> bool {
        self.lock().level == Level::Error
    }

    // ------------------------------------------------------------------
    // Ring buffer
    // ------------------------------------------------------------------

    /// Whether in-memory logging is enabled.
    pub fn use_ring_buffer(&self) -> bool {
        self.lock().use_ring_buffer
    }

    /// Turn in-memory logging on or off. Takes effect at the next
    /// `initialize`.
    pub fn set_use_ring_buffer(&self, value: bool) {
        self.lock().use_ring_buffer = value;
    }

    /// Records currently held by the ring buffer, in insertion order.
    pub fn buffered_records(&self) -> Result<Vec<LogRecord>> {
        let ring = self.lock().ring.clone().ok_or(Error::NoLogTarget)?;
        let ring = ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(ring.records())
    }

    /// The full log contents as text: buffered records flattened one JSON
    /// line at a time in ring-buffer mode, the file's text otherwise.
    pub fn log_contents_as_text(&self) -> Result<String> {
        let (use_ring, ring, path) = {
            let inner = self.lock();
            (inner.use_ring_buffer, inner.ring.clone(), inner.path.clone())
        };

        if use_ring {
            let ring = ring.ok_or(Error::NoLogTarget)?;
            let ring = ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut text = String::new();
            for record in ring.records() {
                text.push_str(&record.to_line());
                text.push_str(EOL);
            }
            Ok(text)
        } else if let Some(path) = path {
            Ok(fs::read_to_string(path)?)
        } else {
            Err(Error::NoLogTarget)
        }
    }

    /// The backing log file path, when file-backed.
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Append a filter to the chain. Filters run in append order.
    pub fn add_filter(&self, filter: FilterFn) {
        self.lock().filters.push(filter);
    }

    /// Number of filters in the chain.
    pub fn filter_count(&self) -> usize {
        self.lock().filters.len()
    }

    /// Run the filter chain over a payload, but only when a record at the
    /// given level would pass the gate.
    pub fn apply_filters(&self, level: impl Into<LevelSpec>, payload: Payload) -> Payload {
        if !self.should_log(level) {
            return payload;
        }
        let filters = self.lock().filters.clone();
        filters
            .iter()
            .fold(payload, |payload, filter| filter(payload))
    }

    /// Run string leaves of a structured value through the filter chain,
    /// preserving the value's shape. Used for console paths that render
    /// structured rows.
    fn filter_strings(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(
                self.apply_filters(LevelSpec::from(Level::Info), Payload::new(text.clone()))
                    .message,
            ),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.filter_strings(item)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.filter_strings(item)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Output configuration
    // ------------------------------------------------------------------

    /// Set human-consumable output. Enables color and console rendering
    /// together; disabling keeps the console JSON-only.
    pub fn set_human_consumable(&self, consumable: bool) {
        let mut inner = self.lock();
        inner.human_consumable = consumable;
        inner.color_enabled = consumable;
    }

    pub fn human_consumable(&self) -> bool {
        self.lock().human_consumable
    }

    pub fn color_enabled(&self) -> bool {
        self.lock().color_enabled
    }

    /// Color functions honoring this logger's color enablement.
    pub fn color(&self) -> ColorPalette {
        ColorPalette::new(self.lock().color_enabled)
    }

    /// Replace the output renderer. Used by tests and embedders.
    pub fn set_renderer(&self, renderer: Arc<Mutex<dyn Renderer>>) {
        self.lock().renderer = renderer;
    }

    fn with_renderer(&self, render: impl FnOnce(&mut dyn Renderer)) {
        let renderer = self.lock().renderer.clone();
        let mut renderer = renderer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        render(&mut *renderer);
    }

    /// Set the command name used in error prefixes. Children created
    /// afterwards inherit it.
    pub fn set_command_name(&self, name: impl Into<String>) {
        self.lock().command_name = Some(name.into());
    }

    /// Record a configuration value surfaced on subsequent records. Only
    /// primitive values survive serialization.
    pub fn set_config(&self, name: impl Into<String>, value: Value) {
        self.lock()
            .config
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
    }

    /// The run mode, from the explicit override or `NIMBUS_ENV`.
    pub fn environment_mode(&self) -> Mode {
        let env_mode = self.lock().env_mode.clone();
        match env_mode {
            Some(value) => Mode::parse(Some(&value)),
            None => Mode::parse(std::env::var(context::ENV_MODE_ENV).ok().as_deref()),
        }
    }

    /// Override the environment-derived run mode.
    pub fn set_environment_mode(&self, value: impl Into<String>) {
        self.lock().env_mode = Some(value.into());
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    // ------------------------------------------------------------------
    // Child derivation
    // ------------------------------------------------------------------

    /// Derive a child logger carrying extra record fields.
    ///
    /// The child shares the parent's stream set, color setting, file path,
    /// and ring buffer; the filter chain is snapshotted at creation.
    /// Human-consumable defaults to the parent's setting unless
    /// overridden. The child is registered in the process-wide registry
    /// under its name (first registration wins).
    pub fn child(
        &self,
        name: &str,
        extra_fields: Map<String, Value>,
        human_consumable: Option<bool>,
    ) -> Result<Logger> {
        if name.is_empty() {
            return Err(Error::NameRequired);
        }

        let child = {
            let inner = self.lock();
            let mut fields = inner.extra_fields.clone();
            for (key, value) in extra_fields {
                fields.insert(key, value);
            }
            Logger {
                inner: Arc::new(Mutex::new(LoggerInner {
                    name: name.to_string(),
                    level: inner.level,
                    state: inner.state,
                    writer: inner.writer.clone(),
                    filters: inner.filters.clone(),
                    human_consumable: human_consumable.unwrap_or(inner.human_consumable),
                    color_enabled: inner.color_enabled,
                    extra_fields: fields,
                    config: None,
                    log_tag: Some(name.to_string()),
                    use_ring_buffer: inner.use_ring_buffer,
                    ring: inner.ring.clone(),
                    path: inner.path.clone(),
                    env_mode: inner.env_mode.clone(),
                    command_name: inner.command_name.clone(),
                    renderer: inner.renderer.clone(),
                })),
            }
        };

        crate::registry::register(child.clone(), name)?;

        self.trace(format!("Setup '{name}' logger instance"));

        Ok(child)
    }

    // ------------------------------------------------------------------
    // Emitters
    // ------------------------------------------------------------------

    fn write_record(&self, level: Level, payload: &Payload) {
        let (record, writer) = {
            let inner = self.lock();
            if inner.state == LoggerState::Closed || level < inner.level {
                return;
            }
            let mut record = LogRecord::new(&inner.name, level, payload);
            record.log = inner.log_tag.clone();
            record.extra = inner.extra_fields.clone();
            record.config = inner.config.clone();
            (record, inner.writer.clone())
        };
        Self::lock_writer(&writer).write(&record);
    }

    fn emit(&self, level: Level, payload: Payload) {
        let payload = self.apply_filters(LevelSpec::from(level), payload);
        self.write_record(level, &payload);
    }

    pub fn trace(&self, payload: impl Into<Payload>) {
        self.emit(Level::Trace, payload.into());
    }

    pub fn debug(&self, payload: impl Into<Payload>) {
        self.emit(Level::Debug, payload.into());
    }

    pub fn info(&self, payload: impl Into<Payload>) {
        self.emit(Level::Info, payload.into());
    }

    pub fn warn(&self, payload: impl Into<Payload>) {
        self.emit(Level::Warn, payload.into());
    }

    /// Write an ERROR record; also formats to stderr when the logger is
    /// human-consumable or JSON rides on stdout.
    pub fn error(&self, payload: impl Into<Payload>) {
        self.error_with_console(true, payload);
    }

    /// [`Logger::error`] with explicit control over console echoing:
    /// `false` keeps the error in the log file only.
    pub fn error_with_console(&self, console: bool, payload: impl Into<Payload>) {
        let payload = self.apply_filters(LevelSpec::from(Level::Error), payload.into());
        if console && (self.human_consumable() || context::json_to_stdout()) {
            let formatted = self.format_error(&payload);
            self.with_renderer(|renderer| renderer.error_line(&formatted));
        }
        self.write_record(Level::Error, &payload);
    }

    /// Write a FATAL record. Fatal output always reaches the error
    /// stream, filtered like everything else.
    pub fn fatal(&self, payload: impl Into<Payload>) {
        let payload = self.apply_filters(LevelSpec::from(Level::Fatal), payload.into());
        let text = payload.to_text();
        self.with_renderer(|renderer| renderer.error_line(&text));
        self.write_record(Level::Fatal, &payload);
    }

    /// Write an INFO record and, when human-consumable, render the
    /// filtered text to the console.
    pub fn log(&self, payload: impl Into<Payload>) -> &Self {
        let payload = self.apply_filters(LevelSpec::from(Level::Info), payload.into());
        if self.human_consumable() {
            let text = payload.to_text();
            self.with_renderer(|renderer| renderer.line(&text));
        }
        self.write_record(Level::Info, &payload);
        self
    }

    /// Like [`Logger::log`] but echoes raw text without a trailing
    /// newline, for same-line console output.
    pub fn log_raw(&self, payload: impl Into<Payload>) -> &Self {
        let payload = self.apply_filters(LevelSpec::from(Level::Info), payload.into());
        self.write_record(Level::Info, &payload);
        if self.human_consumable() {
            let text = payload.to_text();
            self.with_renderer(|renderer| renderer.raw(&text));
        }
        self
    }

    /// Write a JSON blob to stdout and trace it into the log record.
    pub fn log_json(&self, value: &Value) {
        let payload =
            self.apply_filters(LevelSpec::from(Level::Trace), Payload::from(value.clone()));
        let text = payload.to_text();
        self.with_renderer(|renderer| renderer.line(&text));
        self.write_record(Level::Trace, &payload);
    }

    /// Write a JSON blob to stderr and an ERROR record into the log.
    pub fn log_json_error(&self, value: &Value) {
        let payload =
            self.apply_filters(LevelSpec::from(Level::Error), Payload::from(value.clone()));
        let text = payload.to_text();
        self.with_renderer(|renderer| renderer.error_line(&text));
        self.write_record(Level::Error, &payload);
    }

    /// Emit a WARN record and surface the message to the user.
    ///
    /// With JSON output requested the message accumulates on the context
    /// for the JSON envelope, and still goes to stderr while JSON rides
    /// on stdout so the two channels stay separable. Without a JSON
    /// context the warning always goes to stderr.
    pub fn warn_user(&self, context: Option<&mut CommandContext>, message: &str) {
        let warning = format!("{} {message}", self.color().yellow("WARNING:"));
        self.warn(warning.as_str());
        if !self.should_log(LevelSpec::from(Level::Warn)) {
            return;
        }
        match context {
            Some(ctx) if ctx.json => {
                ctx.warnings.push(message.to_string());
                if context::json_to_stdout() {
                    self.with_renderer(|renderer| renderer.error_line(&warning));
                }
            }
            _ => self.with_renderer(|renderer| renderer.error_line(&warning)),
        }
    }

    /// Format a payload for human consumption: a bold
    /// `ERROR running <command>: ` prefix followed by the text in red.
    pub fn format_error(&self, payload: &Payload) -> String {
        let color = self.color();
        let running = self
            .lock()
            .command_name
            .as_ref()
            .map(|command| format!(" running {command}"))
            .unwrap_or_default();
        let mut out = color.bold(&format!("ERROR{running}: "));
        out.push_str(&color.red(&payload.to_text()));
        out
    }

    /// Render a remedial action: the error prefix for its message plus a
    /// "Try this:" suggestion block on stderr. Always writes an ERROR
    /// record.
    pub fn action(&self, action: &RemedialAction) {
        let message = self.apply_filters(
            LevelSpec::from(Level::Error),
            Payload::new(action.message.clone()),
        );
        let suggestion = self.apply_filters(
            LevelSpec::from(Level::Error),
            Payload::new(action.action.clone()),
        );

        if self.human_consumable() {
            let color = self.color();
            let header = self.format_error(&message);
            let try_this = color.blue(&color.bold("Try this:"));
            let text = format!("{header}\n\n{try_this}\n{}", suggestion.message);
            self.with_renderer(|renderer| renderer.error_line(&text));
        }

        self.write_record(
            Level::Error,
            &Payload::with_fields(
                message.message,
                vec![Value::String(suggestion.message)],
            ),
        );
    }

    /// Render tabular data when human-consumable. The row data is written
    /// to an INFO record first; console rendering upper-cases column
    /// labels and filters string cells.
    pub fn table(&self, rows: &[Value], columns: &[Column]) -> &Self {
        self.info(Payload::with_fields(String::new(), rows.to_vec()));
        if self.human_consumable() {
            let rows: Vec<Value> = rows.iter().map(|row| self.filter_strings(row)).collect();
            let columns: Vec<Column> = columns
                .iter()
                .map(|column| column.clone().uppercased())
                .collect();
            self.with_renderer(|renderer| renderer.table(&rows, &columns));
        }
        self
    }

    /// Render a styled key/value hash when human-consumable; always
    /// writes an INFO record first.
    pub fn styled_hash(&self, value: &Value) -> &Self {
        self.info(Payload::from(value.clone()));
        if self.human_consumable() {
            let filtered = self.filter_strings(value);
            let color = self.color();
            self.with_renderer(|renderer| renderer.styled_hash(&filtered, &color));
        }
        self
    }

    /// Render a styled section header when human-consumable; always
    /// writes an INFO record first.
    pub fn styled_header(&self, text: &str) -> &Self {
        self.info(text);
        if self.human_consumable() {
            let filtered = self
                .apply_filters(LevelSpec::from(Level::Info), Payload::new(text))
                .message;
            let color = self.color();
            self.with_renderer(|renderer| renderer.styled_header(&filtered, &color));
        }
        self
    }

    /// Build a deprecation warning for a command or flag.
    pub fn format_deprecation_warning(name: &str, def: &Deprecation, kind: &str) -> String {
        let mut msg = def.message_override.clone().unwrap_or_else(|| {
            format!(
                "The {kind} \"{name}\" has been deprecated and will be removed in v{}.0 or later.",
                def.version + 1
            )
        });
        if let Some(to) = &def.to {
            msg.push_str(&format!(" Use \"{to}\" instead."));
        }
        if let Some(extra) = &def.message {
            msg.push_str(&format!(" {extra}"));
        }
        msg
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Logger")
            .field("name", &inner.name)
            .field("level", &inner.level)
            .field("state", &inner.state)
            .field("human_consumable", &inner.human_consumable)
            .field("use_ring_buffer", &inner.use_ring_buffer)
            .field("path", &inner.path)
            .finish()
    }
}

/// Create the log file and its directory with restrictive permissions if
/// they do not exist yet.
fn ensure_log_file(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        restrict_permissions(parent, 0o700);
    }
    fs::write(path, "")?;
    restrict_permissions(path, 0o600);
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ring_logger(name: &str, level: Level) -> Logger {
        let logger = Logger::new(name).unwrap();
        logger.set_use_ring_buffer(true);
        logger
            .initialize(Some(LevelSpec::from(level.name())), None)
            .unwrap();
        logger
    }

    #[test]
    fn test_empty_name_is_rejected() {
        match Logger::new("") {
            Err(Error::NameRequired) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_ring_buffer_gating_end_to_end() {
        let logger = ring_logger("ring-gate", Level::Warn);

        logger.info("hello");
        assert_eq!(logger.buffered_records().unwrap().len(), 0);

        logger.warn("careful");
        let records = logger.buffered_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].msg, "careful");
    }

    #[test]
    fn test_should_log_is_monotonic() {
        let logger = ring_logger("monotonic", Level::Info);
        assert!(logger.should_log(LevelSpec::from("info")));
        assert!(logger.should_log(LevelSpec::from("error")));
        assert!(!logger.should_log(LevelSpec::from("debug")));

        logger.set_level(Some(LevelSpec::from("error"))).unwrap();
        assert!(!logger.should_log(LevelSpec::from("info")));
        assert!(logger.should_log(LevelSpec::from("error")));
    }

    #[test]
    fn test_should_log_numeric_and_unknown_names() {
        let logger = ring_logger("numeric", Level::Warn);
        assert!(logger.should_log(LevelSpec::from(40)));
        assert!(logger.should_log(LevelSpec::from(55)));
        assert!(!logger.should_log(LevelSpec::from(30)));
        assert!(!logger.should_log(LevelSpec::from("loud")));
    }

    #[test]
    fn test_set_level_default_is_warn() {
        let logger = ring_logger("level-default", Level::Trace);
        logger.set_level(None).unwrap();
        assert_eq!(logger.level(), Level::Warn);
    }

    #[test]
    fn test_initialize_rejects_unknown_level() {
        let logger = Logger::new("bad-level").unwrap();
        logger.set_use_ring_buffer(true);
        let err = logger
            .initialize(Some(LevelSpec::from("loud")), None)
            .unwrap_err();
        match err {
            Error::InvalidLevel { given, valid } => {
                assert_eq!(given, "loud");
                assert!(valid.contains("trace"));
                assert!(valid.contains("fatal"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_file_mode_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nimbus.log");
        let logger = Logger::new("file-mode").unwrap();
        logger
            .initialize(Some(LevelSpec::from("info")), Some(path.clone()))
            .unwrap();

        logger.info("deployed");
        logger.close(None);

        let text = logger.log_contents_as_text().unwrap();
        assert!(text.contains("deployed"));
        assert!(path.exists());
    }

    #[test]
    fn test_duplicate_initialize_attaches_one_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nimbus.log");
        let logger = Logger::new("dup-init").unwrap();
        logger
            .initialize(Some(LevelSpec::from("info")), Some(path.clone()))
            .unwrap();
        logger
            .initialize(Some(LevelSpec::from("info")), Some(path.clone()))
            .unwrap();

        logger.info("once");
        logger.close(None);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_reset_clears_the_log_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nimbus.log");
        let logger = Logger::new("reset").unwrap();
        logger
            .initialize(Some(LevelSpec::from("info")), Some(path.clone()))
            .unwrap();

        logger.info("before reset");
        logger.close(None);
        assert!(logger.log_contents_as_text().unwrap().contains("before reset"));

        logger.reset().unwrap();
        assert_eq!(logger.state(), LoggerState::Initialized);
        assert_eq!(logger.log_contents_as_text().unwrap(), "");

        logger.warn("after reset");
        logger.close(None);
        assert!(logger.log_contents_as_text().unwrap().contains("after reset"));
    }

    #[test]
    fn test_closed_logger_drops_records() {
        let logger = ring_logger("closed", Level::Info);
        logger.close(None);
        assert_eq!(logger.state(), LoggerState::Closed);

        logger.warn("lost");
        assert_eq!(logger.buffered_records().unwrap().len(), 0);
    }

    #[test]
    fn test_no_log_target_error() {
        let logger = Logger::new("no-target").unwrap();
        match logger.log_contents_as_text() {
            Err(Error::NoLogTarget) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_log_contents_as_text_flattens_buffered_records() {
        let logger = ring_logger("flatten", Level::Info);
        logger.warn("one");
        logger.error_with_console(false, "two");

        let text = logger.log_contents_as_text().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["msg"], json!("one"));
    }

    #[test]
    fn test_filters_apply_in_append_order() {
        let logger = ring_logger("filter-order", Level::Info);
        logger.add_filter(Arc::new(|mut payload: Payload| {
            payload.message.push('a');
            payload
        }));
        logger.add_filter(Arc::new(|mut payload: Payload| {
            payload.message.push('b');
            payload
        }));

        logger.info("x");
        let records = logger.buffered_records().unwrap();
        assert_eq!(records[0].msg, "xab");
    }

    #[test]
    fn test_filters_skipped_below_threshold() {
        let logger = ring_logger("filter-gate", Level::Warn);
        logger.add_filter(Arc::new(|mut payload: Payload| {
            payload.message = "rewritten".to_string();
            payload
        }));

        let payload = logger.apply_filters(LevelSpec::from("debug"), Payload::new("original"));
        assert_eq!(payload.message, "original");
    }

    #[test]
    fn test_redaction_filter_protects_the_ring_buffer() {
        let logger = ring_logger("redacted", Level::Info);
        logger.add_filter(Arc::new(|payload: Payload| Payload {
            message: nb_redact::redact_text(&payload.message),
            fields: payload
                .fields
                .into_iter()
                .map(nb_redact::redact_value)
                .collect(),
        }));

        logger.info(r#"{"access_token":"abc123"}"#);
        logger.info(json!({"refresh_token": "5Aep"}));

        let records = logger.buffered_records().unwrap();
        assert_eq!(records[0].msg, "{<access_token - HIDDEN>}");
        let field = records[1].fields[0].as_str().unwrap();
        assert!(field.contains("<refresh_token - HIDDEN>"));
        assert!(!field.contains("5Aep"));
    }

    #[test]
    fn test_child_shares_ring_and_tags_records() {
        let parent = ring_logger("family-root", Level::Info);
        let mut fields = Map::new();
        fields.insert("org".to_string(), json!("dev-hub"));
        let child = parent.child("family-sub", fields, None).unwrap();

        child.info("from child");
        let records = parent.buffered_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].log.as_deref(), Some("family-sub"));
        assert_eq!(records[0].extra["org"], json!("dev-hub"));
        assert_eq!(records[0].name, "family-sub");
    }

    #[test]
    fn test_child_inherits_configuration() {
        let parent = ring_logger("inherit-root", Level::Debug);
        parent.set_human_consumable(false);
        parent.add_filter(Arc::new(|payload| payload));

        let child = parent.child("inherit-sub", Map::new(), None).unwrap();
        assert!(!child.human_consumable());
        assert!(!child.color_enabled());
        assert_eq!(child.filter_count(), 1);
        assert_eq!(child.level(), Level::Debug);
        assert!(child.use_ring_buffer());

        let overridden = parent.child("inherit-human", Map::new(), Some(true)).unwrap();
        assert!(overridden.human_consumable());
    }

    #[test]
    fn test_child_filter_chain_is_a_snapshot() {
        let parent = ring_logger("snapshot-root", Level::Info);
        let child = parent.child("snapshot-sub", Map::new(), None).unwrap();

        parent.add_filter(Arc::new(|payload| payload));
        assert_eq!(parent.filter_count(), 1);
        assert_eq!(child.filter_count(), 0);
    }

    #[test]
    fn test_child_requires_name() {
        let parent = ring_logger("nameless-root", Level::Info);
        match parent.child("", Map::new(), None) {
            Err(Error::NameRequired) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parent_config_not_retroactive_on_children() {
        let parent = ring_logger("config-root", Level::Info);
        let child = parent.child("config-sub", Map::new(), None).unwrap();
        parent.set_config("instanceUrl", json!("https://example.com"));

        child.info("from child");
        let records = parent.buffered_records().unwrap();
        assert!(records[0].config.is_none());
    }

    #[test]
    fn test_set_config_surfaces_primitives_only() {
        let logger = ring_logger("config-sanitize", Level::Info);
        logger.set_config("instanceUrl", json!("https://example.com"));
        logger.set_config("nested", json!({"a": 1}));

        logger.info("configured");
        let records = logger.buffered_records().unwrap();
        let line = records[0].to_json();
        assert_eq!(line["config"]["instanceUrl"], json!("https://example.com"));
        assert!(line["config"].get("nested").is_none());
    }

    #[test]
    fn test_set_human_consumable_sets_both_flags() {
        let logger = Logger::new("human").unwrap();
        logger.set_human_consumable(true);
        assert!(logger.human_consumable());
        assert!(logger.color_enabled());

        logger.set_human_consumable(false);
        assert!(!logger.human_consumable());
        assert!(!logger.color_enabled());
    }

    #[test]
    fn test_format_error_prefix_carries_command_name() {
        let logger = Logger::new("format").unwrap();
        logger.set_command_name("deploy");
        let formatted = logger.format_error(&Payload::new("boom"));
        assert_eq!(formatted, "ERROR running deploy: boom");
    }

    #[test]
    fn test_format_error_without_command_name() {
        let logger = Logger::new("format-bare").unwrap();
        let formatted = logger.format_error(&Payload::new("boom"));
        assert_eq!(formatted, "ERROR: boom");
    }

    #[test]
    fn test_warn_user_accumulates_json_warnings() {
        let logger = ring_logger("warn-user", Level::Warn);
        logger.set_human_consumable(false);
        let mut context = CommandContext::new(true);

        logger.warn_user(Some(&mut context), "org expires soon");
        assert_eq!(context.warnings, vec!["org expires soon"]);

        let records = logger.buffered_records().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].msg.contains("org expires soon"));
    }

    #[test]
    fn test_warn_user_below_threshold_skips_console_but_not_record() {
        let logger = ring_logger("warn-gated", Level::Error);
        let mut context = CommandContext::new(true);
        logger.warn_user(Some(&mut context), "quiet");
        assert!(context.warnings.is_empty());
        assert_eq!(logger.buffered_records().unwrap().len(), 0);
    }

    #[test]
    fn test_environment_mode_override() {
        let logger = Logger::new("mode").unwrap();
        logger.set_environment_mode("demo");
        assert!(logger.environment_mode().is_demo());
    }

    #[test]
    fn test_level_predicates() {
        let logger = ring_logger("predicates", Level::Error);
        assert!(!logger.is_debug_enabled());
        assert!(logger.is_error_level());

        logger.set_level(Some(LevelSpec::from("debug"))).unwrap();
        assert!(logger.is_debug_enabled());
        assert!(!logger.is_error_level());
    }

    #[test]
    fn test_level_name_lookup() {
        let logger = ring_logger("names", Level::Warn);
        assert_eq!(logger.level_name(Some(50)), Some("error"));
        assert_eq!(logger.level_name(Some(42)), None);
        assert_eq!(logger.level_name(None), Some("warn"));
    }

    #[test]
    fn test_deprecation_warning_variants() {
        let def = Deprecation {
            version: 41,
            to: Some("project deploy".to_string()),
            message: Some("See the migration guide.".to_string()),
            message_override: None,
        };
        let msg = Logger::format_deprecation_warning("push", &def, "command");
        assert_eq!(
            msg,
            "The command \"push\" has been deprecated and will be removed in v42.0 or later. \
             Use \"project deploy\" instead. See the migration guide."
        );

        let overridden = Deprecation {
            message_override: Some("Gone.".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Logger::format_deprecation_warning("push", &overridden, "command"),
            "Gone."
        );
    }

    #[test]
    fn test_clones_share_state() {
        let logger = ring_logger("clones", Level::Info);
        let alias = logger.clone();
        assert!(logger.same_as(&alias));

        alias.set_level(Some(LevelSpec::from("fatal"))).unwrap();
        assert_eq!(logger.level(), Level::Fatal);
    }
}
