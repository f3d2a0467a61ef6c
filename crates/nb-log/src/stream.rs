//! Log streams, the ring buffer, and the record writer.
//!
//! The [`RecordWriter`] is the minimal record-writing capability a logger
//! family owns: attach streams, fan records out to every stream whose
//! threshold admits them, set levels uniformly, and close with per-stream
//! failure isolation. A parent logger and its children share one writer.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::level::Level;
use crate::record::LogRecord;

/// Capacity of the in-memory ring buffer.
pub const RING_BUFFER_LIMIT: usize = 5000;

/// Fixed-capacity circular store of log records.
#[derive(Debug)]
pub struct RingBuffer {
    limit: usize,
    records: VecDeque<LogRecord>,
}

impl Default for RingBuffer {
    fn default() -> Self {
        RingBuffer::new(RING_BUFFER_LIMIT)
    }
}

impl RingBuffer {
    pub fn new(limit: usize) -> Self {
        RingBuffer {
            limit,
            records: VecDeque::with_capacity(limit.min(64)),
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn push(&mut self, record: LogRecord) {
        if self.limit > 0 && self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Current contents in insertion order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Where a stream delivers records.
pub enum StreamTarget {
    /// Append-mode file, one JSON record per line.
    File { path: PathBuf, file: File },
    /// Shared in-memory ring buffer.
    Memory(Arc<Mutex<RingBuffer>>),
}

/// A single attached stream with its own level threshold.
pub struct LogStream {
    pub target: StreamTarget,
    pub min_level: Level,
}

impl LogStream {
    /// Open `path` for appending and wrap it in a stream.
    pub fn file(path: &Path, min_level: Level) -> Result<LogStream> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(LogStream {
            target: StreamTarget::File {
                path: path.to_path_buf(),
                file,
            },
            min_level,
        })
    }

    /// Wrap a shared ring buffer in a stream.
    pub fn memory(ring: Arc<Mutex<RingBuffer>>, min_level: Level) -> LogStream {
        LogStream {
            target: StreamTarget::Memory(ring),
            min_level,
        }
    }

    /// The backing file path, for file streams.
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            StreamTarget::File { path, .. } => Some(path),
            StreamTarget::Memory(_) => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.target, StreamTarget::File { .. })
    }
}

/// Minimal record-writing capability owned by a logger family.
#[derive(Default)]
pub struct RecordWriter {
    streams: Vec<LogStream>,
}

impl RecordWriter {
    pub fn new() -> Self {
        RecordWriter::default()
    }

    pub fn add_stream(&mut self, stream: LogStream) {
        self.streams.push(stream);
    }

    /// True when a file stream is already attached for `path`.
    pub fn has_file_stream(&self, path: &Path) -> bool {
        self.streams.iter().any(|stream| stream.path() == Some(path))
    }

    /// Fan a record out to every stream whose threshold admits it.
    ///
    /// Write failures are swallowed: logging must never crash the host
    /// program.
    pub fn write(&mut self, record: &LogRecord) {
        for stream in &mut self.streams {
            if record.level < stream.min_level {
                continue;
            }
            match &mut stream.target {
                StreamTarget::File { file, .. } => {
                    let _ = writeln!(file, "{}", record.to_line());
                }
                StreamTarget::Memory(ring) => {
                    let mut ring = ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    ring.push(record.clone());
                }
            }
        }
    }

    /// Set the threshold of every attached stream.
    pub fn set_level(&mut self, level: Level) {
        for stream in &mut self.streams {
            stream.min_level = level;
        }
    }

    /// Invoke the hook on each stream, then flush file-backed streams.
    ///
    /// Failures are isolated per stream so every stream gets its close
    /// attempt. Safe to call repeatedly.
    pub fn close(&mut self, mut hook: Option<&mut dyn FnMut(&LogStream)>) {
        for stream in &mut self.streams {
            if let Some(hook) = hook.as_mut() {
                hook(stream);
            }
            if let StreamTarget::File { file, .. } = &mut stream.target {
                let _ = file.flush();
            }
        }
    }

    /// Paths of all attached file streams.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.streams
            .iter()
            .filter_map(|stream| stream.path().map(Path::to_path_buf))
            .collect()
    }

    /// Detach every stream.
    pub fn clear(&mut self) {
        self.streams.clear();
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
