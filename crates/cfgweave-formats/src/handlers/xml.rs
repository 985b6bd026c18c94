//! XML format handler
//!
//! Child elements of the root become object members keyed by tag name. A
//! childless element becomes its text, or null when it has none. Repeated
//! tags keep the last occurrence.

use cfgweave_core::{Error, Result};
use roxmltree::{Document, Node};
use serde_json::{Map, Value};

use crate::format::{Format, FormatParser};

/// Handler for XML files
#[derive(Debug, Default)]
pub struct XmlParser;

impl XmlParser {
    pub fn new() -> Self {
        Self
    }
}

fn element_to_json(node: Node<'_, '_>) -> Value {
    let mut children = node.children().filter(Node::is_element).peekable();
    if children.peek().is_none() {
        return node
            .text()
            .map_or(Value::Null, |text| Value::String(text.to_string()));
    }
    let mut map = Map::new();
    for child in children {
        map.insert(child.tag_name().name().to_string(), element_to_json(child));
    }
    Value::Object(map)
}

impl FormatParser for XmlParser {
    fn name(&self) -> &str {
        Format::Xml.name()
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let document = Document::parse(source).map_err(|e| Error::parse("XML", e.to_string()))?;
        Ok(element_to_json(document.root_element()))
    }
}
