//! JSON formatting for descriptors, selections and records

use serde_json::Value;

use super::ResultData;
use crate::error::Result;

/// JSON formatter with pretty printing support
pub struct JsonFormatter {
    /// Enable pretty printing
    pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    ///
    /// # Arguments
    /// * `pretty` - Enable pretty printing
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Format result data as JSON
    ///
    /// # Arguments
    /// * `data` - Result data to format
    ///
    /// # Returns
    /// * `Result<String>` - JSON string or error
    pub fn format(&self, data: &ResultData) -> Result<String> {
        let value = match data {
            ResultData::Descriptor(descriptor) => serde_json::to_value(descriptor)?,
            ResultData::Selection(candidate) => serde_json::to_value(candidate)?,
            ResultData::Records(records) => {
                Value::Array(records.iter().cloned().map(Value::Object).collect())
            }
            ResultData::Message(message) => return Ok(message.clone()),
        };
        self.render(&value)
    }

    fn render(&self, value: &Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}
