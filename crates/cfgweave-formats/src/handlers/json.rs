//! JSON format handler

use cfgweave_core::{Error, Result};
use serde_json::Value;

use crate::format::{Format, FormatParser};

/// Handler for JSON files
#[derive(Debug, Default)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for JsonParser {
    fn name(&self) -> &str {
        Format::Json.name()
    }

    fn parse(&self, source: &str) -> Result<Value> {
        serde_json::from_str(source).map_err(|e| Error::parse("JSON", e.to_string()))
    }

    fn render(&self, value: &Value) -> Result<String> {
        serde_json::to_string_pretty(value).map_err(|e| Error::parse("JSON", e.to_string()))
    }
}
