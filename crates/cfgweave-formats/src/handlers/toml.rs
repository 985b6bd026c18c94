//! TOML format handler

use cfgweave_core::{Error, Result};
use serde_json::{Map, Number, Value};

use crate::format::{Format, FormatParser};

/// Handler for TOML files
#[derive(Debug, Default)]
pub struct TomlParser;

impl TomlParser {
    pub fn new() -> Self {
        Self
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => table_to_json(table),
    }
}

fn table_to_json(table: toml::Table) -> Value {
    Value::Object(
        table
            .into_iter()
            .map(|(key, value)| (key, toml_to_json(value)))
            .collect::<Map<_, _>>(),
    )
}

/// TOML has no null; null members are dropped.
fn json_to_toml(value: &Value) -> Option<toml::Value> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(toml::Value::Boolean(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(toml::Value::Integer)
            .or_else(|| n.as_f64().map(toml::Value::Float)),
        Value::String(s) => Some(toml::Value::String(s.clone())),
        Value::Array(items) => Some(toml::Value::Array(
            items.iter().filter_map(json_to_toml).collect(),
        )),
        Value::Object(map) => Some(toml::Value::Table(
            map.iter()
                .filter_map(|(k, v)| json_to_toml(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
    }
}

impl FormatParser for TomlParser {
    fn name(&self) -> &str {
        Format::Toml.name()
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let table: toml::Table = source
            .parse()
            .map_err(|e: toml::de::Error| Error::parse("TOML", e.to_string()))?;
        Ok(table_to_json(table))
    }

    fn render(&self, value: &Value) -> Result<String> {
        match json_to_toml(value) {
            Some(toml::Value::Table(table)) => {
                toml::to_string_pretty(&table).map_err(|e| Error::parse("TOML", e.to_string()))
            }
            _ => Err(Error::parse("TOML", "top-level value must be a table")),
        }
    }
}
