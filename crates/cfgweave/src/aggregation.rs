//! Combining configuration fragments
//!
//! Fragments arrive in precedence order: declared files, then command line
//! file overlays, then command line key overlays. Later fragments win.

use cfgweave_core::{Context, Error, Operator, Priority, Result, Stage};
use serde_json::{Map, Value};

use crate::factory::Factory;
use crate::spec::AggregationSpec;

pub type AggregatorFactory = Factory<AggregationSpec, Vec<Value>, Value>;

/// Built-in merge strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Choose overlay or concatenation from the fragment shapes.
    Infer,
    Overlay,
    DeepMerge,
    Concat,
}

/// Aggregation stage for one [`MergeMode`].
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    mode: MergeMode,
}

impl Aggregator {
    pub fn new(mode: MergeMode) -> Self {
        Self { mode }
    }

    pub fn aggregate(&self, fragments: Vec<Value>) -> Result<Value> {
        tracing::debug!(mode = ?self.mode, fragments = fragments.len(), "Aggregating fragments");
        match self.mode {
            MergeMode::Infer => infer(fragments),
            MergeMode::Overlay => overlay(fragments),
            MergeMode::DeepMerge => deep_merge(fragments),
            MergeMode::Concat => concat(fragments),
        }
    }
}

impl Stage<Vec<Value>, Value> for Aggregator {
    fn apply(&self, _ctx: &mut Context, fragments: Vec<Value>) -> Result<Value> {
        self.aggregate(fragments)
    }

    fn name(&self) -> &str {
        match self.mode {
            MergeMode::Infer => "infer_aggregator",
            MergeMode::Overlay => "overlay_aggregator",
            MergeMode::DeepMerge => "deep_merge_aggregator",
            MergeMode::Concat => "concat_aggregator",
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn shapes(fragments: &[Value]) -> String {
    fragments.iter().map(kind).collect::<Vec<_>>().join(", ")
}

fn objects(fragments: Vec<Value>, strategy: &str) -> Result<Vec<Map<String, Value>>> {
    let summary = shapes(&fragments);
    fragments
        .into_iter()
        .map(|fragment| match fragment {
            Value::Object(map) => Ok(map),
            _ => Err(Error::aggregation(format!(
                "{strategy} needs mappings, got [{summary}]"
            ))),
        })
        .collect()
}

/// Shallow merge; for each top-level key the last fragment holding it wins.
pub fn overlay(fragments: Vec<Value>) -> Result<Value> {
    let mut merged = Map::new();
    for map in objects(fragments, "overlay")? {
        merged.extend(map);
    }
    Ok(Value::Object(merged))
}

/// Recursive merge of nested mappings; non-mapping values are replaced.
pub fn deep_merge(fragments: Vec<Value>) -> Result<Value> {
    let mut merged = Value::Object(Map::new());
    for map in objects(fragments, "deep merge")? {
        deep_merge_value(&mut merged, &Value::Object(map));
    }
    Ok(merged)
}

pub fn deep_merge_value(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Object(base_map), Value::Object(other_map)) => {
            for (key, other_val) in other_map {
                match base_map.get_mut(key) {
                    Some(base_val) => deep_merge_value(base_val, other_val),
                    None => {
                        base_map.insert(key.clone(), other_val.clone());
                    }
                }
            }
        }
        (base, other) => *base = other.clone(),
    }
}

/// Concatenate sequences in source order.
pub fn concat(fragments: Vec<Value>) -> Result<Value> {
    let summary = shapes(&fragments);
    let mut items = Vec::new();
    for fragment in fragments {
        match fragment {
            Value::Array(values) => items.extend(values),
            _ => {
                return Err(Error::aggregation(format!(
                    "concat needs sequences, got [{summary}]"
                )));
            }
        }
    }
    Ok(Value::Array(items))
}

/// Pick a strategy from the fragment shapes.
pub fn infer(mut fragments: Vec<Value>) -> Result<Value> {
    match fragments.len() {
        0 => return Ok(Value::Object(Map::new())),
        1 => return Ok(fragments.remove(0)),
        _ => {}
    }
    if fragments.iter().all(Value::is_object) {
        overlay(fragments)
    } else if fragments.iter().all(Value::is_array) {
        concat(fragments)
    } else {
        Err(Error::aggregation(format!(
            "cannot merge mixed fragment shapes [{}]",
            shapes(&fragments)
        )))
    }
}

impl AggregatorFactory {
    /// Factory with the built-in aggregation strategies.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new("aggregation", ());
        factory
            .register_variant(
                "operator",
                |spec: &AggregationSpec| match spec {
                    AggregationSpec::Operator(op) => Some(op.clone()),
                    _ => None,
                },
                |op, _: &Self| Ok(op),
                Priority::Rank(10),
            )
            .register_variant(
                "function",
                |spec: &AggregationSpec| match spec {
                    AggregationSpec::Function(f) => Some(f.clone()),
                    _ => None,
                },
                |f, _: &Self| {
                    Ok(Operator::from_fn("aggregate_fn", move |fragments: Vec<Value>| {
                        f(fragments)
                    }))
                },
                Priority::Rank(20),
            )
            .register_variant(
                "merge",
                |spec: &AggregationSpec| match spec {
                    AggregationSpec::Infer => Some(MergeMode::Infer),
                    AggregationSpec::Overlay => Some(MergeMode::Overlay),
                    AggregationSpec::DeepMerge => Some(MergeMode::DeepMerge),
                    AggregationSpec::Concat => Some(MergeMode::Concat),
                    _ => None,
                },
                |mode, _: &Self| Ok(Operator::new(Aggregator::new(mode))),
                Priority::Rank(30),
            );
        factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(vec![], json!({}))]
    #[case(vec![json!("only")], json!("only"))]
    #[case(vec![json!({"a": 1, "b": 1}), json!({"b": 2})], json!({"a": 1, "b": 2}))]
    #[case(vec![json!([1]), json!([2, 3])], json!([1, 2, 3]))]
    fn test_infer(#[case] fragments: Vec<Value>, #[case] expected: Value) {
        assert_eq!(infer(fragments).unwrap(), expected);
    }

    #[test]
    fn test_mixed_shapes_fail() {
        let err = infer(vec![json!({"a": 1}), json!([1, 2])]).unwrap_err();
        assert!(matches!(err, Error::AggregationFailure { .. }));
        assert!(err.to_string().contains("mapping, sequence"), "got: {err}");
    }

    #[test]
    fn test_overlay_is_shallow() {
        let merged = overlay(vec![
            json!({"db": {"host": "a", "port": 1}}),
            json!({"db": {"port": 2}}),
        ])
        .unwrap();
        assert_eq!(merged, json!({"db": {"port": 2}}));
    }

    #[test]
    fn test_deep_merge_keeps_nested_keys() {
        let merged = deep_merge(vec![
            json!({"db": {"host": "a", "port": 1}, "tags": [1]}),
            json!({"db": {"port": 2}, "tags": [2]}),
        ])
        .unwrap();
        assert_eq!(merged, json!({"db": {"host": "a", "port": 2}, "tags": [2]}));
    }

    #[test]
    fn test_concat_rejects_mappings() {
        assert!(concat(vec![json!([1]), json!({"a": 1})]).is_err());
    }

    #[test]
    fn test_factory_resolves_modes() {
        let factory = AggregatorFactory::with_builtins();
        let op = factory.build(&AggregationSpec::DeepMerge).unwrap();
        assert_eq!(op.name(), "deep_merge_aggregator");
        let op = factory
            .build(&AggregationSpec::function(|fragments| Ok(json!(fragments.len()))))
            .unwrap();
        assert_eq!(op.call(vec![json!(1), json!(2)]).unwrap(), json!(2));
    }

    fn fragment() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::btree_map("[a-e]", any::<i32>(), 0..5)
            .prop_map(|entries| entries.into_iter().map(|(k, v)| (k, json!(v))).collect())
    }

    proptest! {
        #[test]
        fn overlay_takes_the_last_fragment_holding_each_key(
            fragments in prop::collection::vec(fragment(), 0..6)
        ) {
            let values: Vec<Value> = fragments.iter().cloned().map(Value::Object).collect();
            let merged = overlay(values).unwrap();
            let merged = merged.as_object().unwrap();
            for key in ["a", "b", "c", "d", "e"] {
                let expected = fragments.iter().rev().find_map(|f| f.get(key));
                prop_assert_eq!(merged.get(key), expected);
            }
        }

        #[test]
        fn concat_preserves_order_and_count(
            sequences in prop::collection::vec(prop::collection::vec(any::<i64>(), 0..5), 0..6)
        ) {
            let values: Vec<Value> = sequences.iter().map(|s| json!(s)).collect();
            let merged = concat(values).unwrap();
            let expected: Vec<Value> = sequences.concat().into_iter().map(|n| json!(n)).collect();
            prop_assert_eq!(merged, Value::Array(expected));
        }
    }
}
