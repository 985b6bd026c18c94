//! INI format handler
//!
//! Produces one object per section. Option names are lower-cased and values
//! stay strings. Entries of a `DEFAULT` section are inherited by every other
//! section and the `DEFAULT` section itself is not emitted.

use cfgweave_core::{Error, Result};
use ini::Ini;
use serde_json::{Map, Value};

use crate::format::{Format, FormatParser};

const DEFAULT_SECTION: &str = "DEFAULT";

/// Handler for INI files
#[derive(Debug, Default)]
pub struct IniParser;

impl IniParser {
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for IniParser {
    fn name(&self) -> &str {
        Format::Ini.name()
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let ini = Ini::load_from_str_noescape(source)
            .map_err(|e| Error::parse("INI", e.to_string()))?;

        let orphan = ini
            .section(None::<String>)
            .and_then(|general| general.iter().next().map(|(key, _)| key.to_string()));
        if let Some(key) = orphan {
            return Err(Error::parse(
                "INI",
                format!("option {key} appears before any section header"),
            ));
        }

        let mut defaults = Map::new();
        if let Some(props) = ini.section(Some(DEFAULT_SECTION)) {
            for (key, value) in props.iter() {
                defaults.insert(key.to_lowercase(), Value::String(value.to_string()));
            }
        }

        let mut sections = Map::new();
        for (name, props) in ini.iter() {
            let Some(name) = name else { continue };
            if name == DEFAULT_SECTION {
                continue;
            }
            let mut section = defaults.clone();
            for (key, value) in props.iter() {
                section.insert(key.to_lowercase(), Value::String(value.to_string()));
            }
            sections.insert(name.to_string(), Value::Object(section));
        }
        Ok(Value::Object(sections))
    }
}
