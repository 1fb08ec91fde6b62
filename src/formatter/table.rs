//! Table formatting using tabled
//!
//! Records are laid out with one column per field seen in any record;
//! descriptors become a two-column property table.

use std::collections::BTreeSet;

use serde_json::Value;
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Color, Modify, Style, object::Columns, object::Rows, width::Width},
};

use super::ResultData;
use crate::error::Result;
use crate::model::{Record, RequestDescriptor};
use crate::reconcile::SelectionCandidate;

/// Maximum width for a single column (characters)
const DEFAULT_MAX_COLUMN_WIDTH: usize = 40;

/// Table formatter for record windows
pub struct TableFormatter {
    /// Maximum column width
    max_column_width: usize,

    /// Table style
    style: TableStyle,

    /// Enable colored output
    use_colors: bool,

    /// Columns placed before the alphabetical ones
    leading: Vec<String>,
}

/// Available table styles
#[derive(Debug, Clone, Copy)]
pub enum TableStyle {
    /// Modern style with box-drawing characters
    Modern,
    /// ASCII style with basic characters
    Ascii,
    /// Markdown style
    Markdown,
}

impl TableFormatter {
    /// Create a new table formatter with default settings
    pub fn new() -> Self {
        Self::with_colors(false)
    }

    /// Create a new table formatter with color support
    ///
    /// # Arguments
    /// * `use_colors` - Enable colored header
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            style: TableStyle::Modern,
            use_colors,
            leading: Vec::new(),
        }
    }

    /// Set the table style
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Set maximum column width
    pub fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Put these columns first when records carry them
    pub fn with_leading_columns(mut self, columns: Vec<String>) -> Self {
        self.leading = columns;
        self
    }

    /// Format result data as table
    ///
    /// # Arguments
    /// * `data` - Result data to format
    ///
    /// # Returns
    /// * `Result<String>` - Table string or error
    pub fn format(&self, data: &ResultData) -> Result<String> {
        match data {
            ResultData::Descriptor(descriptor) => Ok(self.format_descriptor(descriptor)),
            ResultData::Selection(Some(candidate)) => Ok(self.format_selection(candidate)),
            ResultData::Selection(None) => Ok("(no selection)".to_string()),
            ResultData::Records(records) if records.is_empty() => {
                Ok("(empty result set)".to_string())
            }
            ResultData::Records(records) => Ok(self.format_records(records)),
            ResultData::Message(message) => Ok(message.clone()),
        }
    }

    fn format_descriptor(&self, descriptor: &RequestDescriptor) -> String {
        let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

        let mut builder = Builder::default();
        builder.push_record(["property", "value"]);
        builder.push_record(["filter".to_string(), optional(descriptor.filter.clone())]);
        builder.push_record(["order by".to_string(), optional(descriptor.order_by.clone())]);
        builder.push_record(["page size".to_string(), descriptor.page_size.to_string()]);
        builder.push_record([
            "continuation".to_string(),
            optional(descriptor.continuation.as_ref().map(ToString::to_string)),
        ]);
        builder.push_record([
            "direction".to_string(),
            format!("{:?}", descriptor.direction).to_lowercase(),
        ]);

        let mut table = builder.build();
        self.finish(&mut table, 2);
        table.to_string()
    }

    fn format_selection(&self, candidate: &SelectionCandidate) -> String {
        let records = std::slice::from_ref(&candidate.record);
        format!(
            "key: {}\n{}",
            candidate.key,
            self.format_records(records)
        )
    }

    fn format_records(&self, records: &[Record]) -> String {
        let fields = extract_field_names(records, &self.leading);
        if fields.is_empty() {
            return "(no fields found)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(fields.clone());
        for record in records {
            let row: Vec<String> = fields
                .iter()
                .map(|field| record.get(field).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }

        let mut table = builder.build();
        self.finish(&mut table, fields.len());
        table.to_string()
    }

    fn finish(&self, table: &mut Table, columns: usize) {
        match self.style {
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Markdown => table.with(Style::markdown()),
        };

        for i in 0..columns {
            table.with(Modify::new(Columns::new(i..=i)).with(Width::wrap(self.max_column_width)));
        }
        table.with(Modify::new(Rows::first()).with(Alignment::center()));

        if self.use_colors {
            table.modify(Rows::first(), Color::FG_CYAN | Color::BOLD);
        }
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// All field names across `records`, `leading` ones first, the rest sorted.
fn extract_field_names(records: &[Record], leading: &[String]) -> Vec<String> {
    let all: BTreeSet<&String> = records.iter().flat_map(|record| record.keys()).collect();

    let mut fields: Vec<String> = leading
        .iter()
        .filter(|name| all.contains(name))
        .cloned()
        .collect();
    fields.extend(
        all.into_iter()
            .filter(|field| !leading.contains(*field))
            .cloned(),
    );
    fields
}

/// Cell text for a JSON value
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) if items.len() <= 3 => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Array(items) => format!("[Array({})]", items.len()),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) if map.len() <= 2 => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        Value::Object(map) => format!("{{Object({})}}", map.len()),
    }
}
