//! Log record shape and payload normalization.
//!
//! Callers hand the logger strings, objects, or arrays; everything is
//! normalized into a [`Payload`] once at the boundary so filters and
//! formatters never type-sniff downstream.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::level::Level;

/// A normalized log entry: a message plus an ordered field list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub message: String,
    pub fields: Vec<Value>,
}

impl Payload {
    pub fn new(message: impl Into<String>) -> Self {
        Payload {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(message: impl Into<String>, fields: Vec<Value>) -> Self {
        Payload {
            message: message.into(),
            fields,
        }
    }

    /// Display text for console output: the message followed by each field,
    /// strings bare and everything else as JSON.
    pub fn to_text(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.fields.len());
        if !self.message.is_empty() {
            parts.push(self.message.clone());
        }
        for field in &self.fields {
            parts.push(value_text(field));
        }
        parts.join(" ")
    }
}

impl From<&str> for Payload {
    fn from(message: &str) -> Self {
        Payload::new(message)
    }
}

impl From<String> for Payload {
    fn from(message: String) -> Self {
        Payload::new(message)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(message) => Payload::new(message),
            other => Payload::with_fields(String::new(), vec![other]),
        }
    }
}

/// Display text for a structured value: strings bare, null empty,
/// everything else canonical JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A single structured log record, one JSON object per line on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// RFC-3339 timestamp.
    pub ts: String,
    pub level: Level,
    /// Name of the emitting logger.
    pub name: String,
    pub msg: String,
    /// Ordered structured fields from the payload.
    pub fields: Vec<Value>,
    /// Extra fields attached at child derivation.
    pub extra: Map<String, Value>,
    /// Child logger tag.
    pub log: Option<String>,
    /// Configuration map; sanitized to primitives on serialization.
    pub config: Option<Map<String, Value>>,
}

impl LogRecord {
    pub fn new(name: &str, level: Level, payload: &Payload) -> Self {
        LogRecord {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            name: name.to_string(),
            msg: payload.message.clone(),
            fields: payload.fields.clone(),
            extra: Map::new(),
            log: None,
            config: None,
        }
    }

    /// The JSON form written to streams.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("ts".to_string(), json!(self.ts));
        map.insert("level".to_string(), json!(self.level.value()));
        map.insert("name".to_string(), json!(self.name));
        if let Some(log) = &self.log {
            map.insert("log".to_string(), json!(log));
        }
        for (key, value) in &self.extra {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
        if let Some(config) = &self.config {
            map.insert(
                "config".to_string(),
                Value::Object(sanitize_config(config)),
            );
        }
        map.insert("msg".to_string(), json!(self.msg));
        if !self.fields.is_empty() {
            map.insert("fields".to_string(), Value::Array(self.fields.clone()));
        }
        Value::Object(map)
    }

    /// The single line written to a file stream, without the terminator.
    pub fn to_line(&self) -> String {
        self.to_json().to_string()
    }
}

/// Keep only primitive config values. Structured values are dropped from
/// the persisted record.
pub fn sanitize_config(config: &Map<String, Value>) -> Map<String, Value> {
    config
        .iter()
        .filter(|(_, value)| {
            matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
