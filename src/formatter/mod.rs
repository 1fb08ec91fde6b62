//! Output formatting for the command-line tool
//!
//! Renders descriptors, selections and record windows as compact JSON,
//! pretty JSON or a terminal table.

mod colorizer;
mod json;
mod table;

pub use colorizer::{AnsiColors, Colorizer};
pub use json::JsonFormatter;
pub use table::{TableFormatter, TableStyle};

use crate::config::{DisplayConfig, OutputFormat};
use crate::error::Result;
use crate::model::{Record, RequestDescriptor};
use crate::reconcile::SelectionCandidate;

/// Anything the CLI prints.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultData {
    /// A built request descriptor
    Descriptor(RequestDescriptor),

    /// Outcome of a reconciliation or pick
    Selection(Option<SelectionCandidate>),

    /// A window of records
    Records(Vec<Record>),

    /// Plain text, printed as-is in every format
    Message(String),
}

/// Main formatter dispatching on the configured output format
pub struct Formatter {
    format: OutputFormat,
    json: JsonFormatter,
    table: TableFormatter,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format` - Output format to use
    /// * `use_colors` - Enable colored output
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self {
            format,
            json: JsonFormatter::new(format == OutputFormat::JsonPretty),
            table: TableFormatter::with_colors(use_colors),
        }
    }

    /// Create a formatter from display configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.format, config.color_output)
    }

    /// Put these columns first in tables
    pub fn with_leading_columns(mut self, columns: Vec<String>) -> Self {
        self.table = self.table.with_leading_columns(columns);
        self
    }

    /// Format result data
    ///
    /// # Arguments
    /// * `data` - Data to render
    ///
    /// # Returns
    /// * `Result<String>` - Rendered output or error
    pub fn format(&self, data: &ResultData) -> Result<String> {
        if let ResultData::Message(message) = data {
            return Ok(message.clone());
        }

        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.json.format(data),
            OutputFormat::Table => self.table.format(data),
        }
    }
}
