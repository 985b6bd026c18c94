//! Section selection on parsed documents

use cfgweave_core::{Context, Error, Operator, Priority, Result, Stage};
use serde_json::Value;

use crate::factory::Factory;
use crate::spec::{SectionSpec, Segment};

pub type SectionSelectorFactory = Factory<SectionSpec, Value, Value>;

/// Keeps the sub-value found by following a path of keys and indices.
#[derive(Debug, Clone)]
pub struct SectionSelector {
    path: Vec<Segment>,
}

impl SectionSelector {
    pub fn new(path: Vec<Segment>) -> Self {
        Self { path }
    }

    pub fn select(&self, mut value: Value) -> Result<Value> {
        for (depth, segment) in self.path.iter().enumerate() {
            let next = match (segment, &mut value) {
                (Segment::Key(key), Value::Object(map)) => map.remove(key),
                (Segment::Index(index), Value::Array(items)) if *index < items.len() => {
                    Some(items.swap_remove(*index))
                }
                _ => None,
            };
            value = next.ok_or_else(|| Error::SectionNotFound {
                section: self.describe(depth + 1),
                available: available_keys(&value),
            })?;
        }
        Ok(value)
    }

    /// The first `len` segments, rendered like `servers[0].host`.
    fn describe(&self, len: usize) -> String {
        let mut rendered = String::new();
        for segment in &self.path[..len] {
            if matches!(segment, Segment::Key(_)) && !rendered.is_empty() {
                rendered.push('.');
            }
            rendered.push_str(&segment.to_string());
        }
        rendered
    }
}

fn available_keys(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|i| format!("[{i}]")).collect(),
        _ => Vec::new(),
    }
}

impl Stage<Value, Value> for SectionSelector {
    fn apply(&self, _ctx: &mut Context, value: Value) -> Result<Value> {
        self.select(value)
    }

    fn name(&self) -> &str {
        "section_selector"
    }
}

impl SectionSelectorFactory {
    /// Factory with the built-in section strategies.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new("section", ());
        factory
            .register_variant(
                "absent",
                |spec: &SectionSpec| matches!(spec, SectionSpec::Absent).then_some(()),
                |(), _: &Self| Ok(Operator::identity()),
                Priority::Rank(0),
            )
            .register_variant(
                "operator",
                |spec: &SectionSpec| match spec {
                    SectionSpec::Operator(op) => Some(op.clone()),
                    _ => None,
                },
                |op, _: &Self| Ok(op),
                Priority::Rank(10),
            )
            .register_variant(
                "function",
                |spec: &SectionSpec| match spec {
                    SectionSpec::Function(f) => Some(f.clone()),
                    _ => None,
                },
                |f, _: &Self| Ok(Operator::from_fn("section_fn", move |value: Value| f(value))),
                Priority::Rank(20),
            )
            .register_variant(
                "path",
                |spec: &SectionSpec| match spec {
                    SectionSpec::Key(key) => Some(vec![Segment::Key(key.clone())]),
                    SectionSpec::Path(path) => Some(path.clone()),
                    _ => None,
                },
                |path, _: &Self| Ok(Operator::new(SectionSelector::new(path))),
                Priority::Rank(30),
            );
        factory
    }
}
