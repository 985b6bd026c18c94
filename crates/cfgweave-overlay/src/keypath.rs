//! Nested fragments from dotted key paths

use std::fmt;
use std::sync::Arc;

use cfgweave_core::{Context, Error, Result, Stage};
use serde_json::{Map, Value};

use crate::constants::DEFAULT_KEY_DELIMITER;

/// Decodes the raw text of a key overlay value.
pub type ValueParser = Arc<dyn Fn(&str) -> std::result::Result<Value, String> + Send + Sync>;

/// Decode overlay values as JSON.
pub fn json_value_parser() -> ValueParser {
    Arc::new(|raw: &str| serde_json::from_str::<Value>(raw).map_err(|e| e.to_string()))
}

/// Wrap `value` in one single-key object per path segment, innermost last.
///
/// `nest(["a", "b"], 1)` gives `{"a": {"b": 1}}`; an empty path gives the
/// value itself.
pub fn nest<I>(path: I, value: Value) -> Value
where
    I: IntoIterator,
    I::Item: Into<String>,
    I::IntoIter: DoubleEndedIterator,
{
    path.into_iter().rev().fold(value, |inner, segment| {
        let mut map = Map::new();
        map.insert(segment.into(), inner);
        Value::Object(map)
    })
}

/// Turns a `(key.path, raw value)` pair into a nested fragment.
#[derive(Clone)]
pub struct KeyPathBuilder {
    delimiter: String,
    parser: ValueParser,
}

impl KeyPathBuilder {
    pub fn new(delimiter: impl Into<String>, parser: ValueParser) -> Self {
        Self {
            delimiter: delimiter.into(),
            parser,
        }
    }

    pub fn build(&self, key: &str, raw: &str) -> Result<Value> {
        let value = (self.parser)(raw).map_err(|message| Error::OverlayValue {
            key: key.to_string(),
            value: raw.to_string(),
            message,
        })?;
        let segments: Vec<&str> = key.split(self.delimiter.as_str()).collect();
        Ok(nest(segments, value))
    }
}

impl Default for KeyPathBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_DELIMITER, json_value_parser())
    }
}

impl fmt::Debug for KeyPathBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPathBuilder")
            .field("delimiter", &self.delimiter)
            .finish_non_exhaustive()
    }
}

impl Stage<(String, String), Value> for KeyPathBuilder {
    fn apply(&self, _ctx: &mut Context, (key, raw): (String, String)) -> Result<Value> {
        tracing::trace!(%key, %raw, "Building key overlay");
        self.build(&key, &raw)
    }

    fn name(&self) -> &str {
        "key_path"
    }
}
