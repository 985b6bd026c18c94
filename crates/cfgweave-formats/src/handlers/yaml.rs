//! YAML format handler using serde_yaml

use cfgweave_core::{Error, Result};
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::format::{Format, FormatParser};

/// Handler for YAML files using serde_yaml
#[derive(Debug, Default)]
pub struct YamlParser;

impl YamlParser {
    pub fn new() -> Self {
        Self
    }
}

/// Convert a YAML tree, stringifying scalar mapping keys.
fn yaml_to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    YamlValue::String(s) => s,
                    YamlValue::Bool(b) => b.to_string(),
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Null => "null".to_string(),
                    other => {
                        tracing::warn!(?other, "Skipping YAML mapping key that is not a scalar");
                        continue;
                    }
                };
                map.insert(key, yaml_to_json(value));
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

impl FormatParser for YamlParser {
    fn name(&self) -> &str {
        Format::Yaml.name()
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let value: YamlValue =
            serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?;
        Ok(yaml_to_json(value))
    }

    fn render(&self, value: &Value) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| Error::parse("YAML", e.to_string()))
    }
}
