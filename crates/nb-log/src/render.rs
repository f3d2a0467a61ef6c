//! Console rendering for human-consumable output.
//!
//! The logger treats the renderer as an opaque collaborator: it hands over
//! plain lines, JSON blobs, tabular data with column specs, styled hashes,
//! and styled headers, and never inspects what the renderer does with them.

use std::io::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::color::ColorPalette;
use crate::record::value_text;

/// Formatter applied to a single cell value.
pub type CellFormat = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Table column specification.
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub format: Option<CellFormat>,
}

impl Column {
    /// Column whose label is derived from the key.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Column {
            label: key.clone(),
            key,
            format: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_format(mut self, format: CellFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// The same column with an upper-cased label.
    pub fn uppercased(mut self) -> Self {
        self.label = self.label.to_uppercase();
        self
    }

    /// Cell text for a row: the keyed value through the formatter, or its
    /// default display text.
    pub fn cell_text(&self, row: &Value) -> String {
        let value = row.get(&self.key).cloned().unwrap_or(Value::Null);
        match &self.format {
            Some(format) => format(&value),
            None => value_text(&value),
        }
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("format", &self.format.is_some())
            .finish()
    }
}

/// Renders human-consumable output.
pub trait Renderer: Send {
    /// A plain line to stdout.
    fn line(&mut self, text: &str);

    /// Raw text to stdout without a trailing newline, for same-line output.
    fn raw(&mut self, text: &str);

    /// A plain line to stderr.
    fn error_line(&mut self, text: &str);

    /// Tabular data.
    fn table(&mut self, rows: &[Value], columns: &[Column]);

    /// A key/value hash with styled keys.
    fn styled_hash(&mut self, value: &Value, color: &ColorPalette);

    /// A section header.
    fn styled_header(&mut self, text: &str, color: &ColorPalette);
}

/// Default renderer writing to stdout/stderr.
#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }

    fn raw(&mut self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn error_line(&mut self, text: &str) {
        eprintln!("{text}");
    }

    fn table(&mut self, rows: &[Value], columns: &[Column]) {
        for line in layout_table(rows, columns) {
            println!("{line}");
        }
    }

    fn styled_hash(&mut self, value: &Value, color: &ColorPalette) {
        if let Value::Object(map) = value {
            for (key, entry) in map {
                println!("{}: {}", color.cyan(key), value_text(entry));
            }
        } else {
            println!("{}", value_text(value));
        }
    }

    fn styled_header(&mut self, text: &str, color: &ColorPalette) {
        println!("=== {}", color.bold(text));
    }
}

/// Lay a table out as space-padded lines: header, separator, one line per
/// row.
pub fn layout_table(rows: &[Value], columns: &[Column]) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|column| column.cell_text(row)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(pad_row(
        &columns
            .iter()
            .map(|column| column.label.clone())
            .collect::<Vec<_>>(),
        &widths,
    ));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &cells {
        lines.push(pad_row(row, &widths));
    }
    lines
}

fn pad_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
