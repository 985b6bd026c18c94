//! Plugins extending the registry
//!
//! Covers the three extension points: new file formats, new strategies for
//! `Custom` specs, and fallbacks that catch otherwise unresolvable specs.

use cfgweave::{
    ConfigLoader, CustomSpec, Error, InterpolationSpec, Operator, Plugin, Priority, Registry,
    Result, ValidationSpec,
};
use cfgweave_formats::FormatParser;
use cfgweave_test_utils::ConfigFixture;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

// =============================================================================
// Test plugins
// =============================================================================

/// `KEY=value` lines, `#` comments.
struct DotenvParser;

impl FormatParser for DotenvParser {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn parse(&self, source: &str) -> Result<Value> {
        let mut map = Map::new();
        for line in source.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| Error::parse("dotenv", format!("expected KEY=value, got {line}")))?;
            map.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
        }
        Ok(Value::Object(map))
    }
}

struct Dotenv;

impl Plugin for Dotenv {
    fn name(&self) -> &str {
        "dotenv"
    }

    fn register(&self, registry: &mut Registry) {
        registry.formats_mut().register(&["env"], DotenvParser);
    }
}

/// Validator for `Custom("port_range")` specs: payload `[min, max]`
/// bounds the top-level `port`.
struct PortRange;

impl Plugin for PortRange {
    fn name(&self) -> &str {
        "port_range"
    }

    fn register(&self, registry: &mut Registry) {
        registry.validation.register_variant(
            "port_range",
            |spec: &ValidationSpec| match spec {
                ValidationSpec::Custom(custom) if custom.is("port_range") => {
                    let bounds = custom.payload.as_array()?;
                    Some((bounds.first()?.as_u64()?, bounds.get(1)?.as_u64()?))
                }
                _ => None,
            },
            |(min, max), _| {
                Ok(Operator::from_fn("port_range", move |value: Value| {
                    match value.get("port").and_then(Value::as_u64) {
                        Some(port) if (min..=max).contains(&port) => Ok(value),
                        other => Err(Error::invalid_config(
                            "port_range",
                            format!("port {other:?} outside {min}..={max}"),
                        )),
                    }
                }))
            },
            Priority::First,
        );
    }
}

/// Turns every unresolvable interpolation spec into upper-casing.
struct ShoutFallback;

impl Plugin for ShoutFallback {
    fn name(&self) -> &str {
        "shout"
    }

    fn register(&self, registry: &mut Registry) {
        registry
            .interpolation
            .register_fallback("shout", |_: &InterpolationSpec, _| {
                Ok(Operator::from_fn("shout", |text: String| Ok(text.to_uppercase())))
            });
    }
}

fn registry(plugins: &[&dyn Plugin]) -> Registry {
    let mut registry = Registry::with_builtins();
    for plugin in plugins {
        registry.install(*plugin);
    }
    registry
}

// =============================================================================
// Formats
// =============================================================================

#[test]
fn test_plugin_format_is_inferred_from_suffix() {
    let fixture = ConfigFixture::new()
        .with_file("base.json", r#"{"host": "a", "port": "1"}"#)
        .with_file("local.env", "# local\nport = 2\n");
    let config = ConfigLoader::new()
        .registry(registry(&[&Dotenv]))
        .files(fixture.paths(&["base.json", "local.env"]))
        .args(Vec::<String>::new())
        .load()
        .unwrap();
    assert_eq!(config, json!({"host": "a", "port": "2"}));
}

#[test]
fn test_format_is_unknown_without_plugin() {
    let fixture = ConfigFixture::new().with_file("local.env", "port=2\n");
    let err = ConfigLoader::new()
        .file(fixture.path("local.env"))
        .args(Vec::<String>::new())
        .load()
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFileExtension { .. }));
}

// =============================================================================
// Custom strategies
// =============================================================================

fn port_range(min: u64, max: u64) -> ValidationSpec {
    ValidationSpec::Custom(CustomSpec::new("port_range", json!([min, max])))
}

#[test]
fn test_custom_validator_accepts_and_rejects() {
    let fixture = ConfigFixture::new().with_file("app.yaml", "port: 8080\n");
    let loader = ConfigLoader::new()
        .registry(registry(&[&PortRange]))
        .file(fixture.path("app.yaml"));

    let ok = loader.clone().validation(port_range(1024, 65535)).args(Vec::<String>::new());
    assert_eq!(ok.load().unwrap(), json!({"port": 8080}));

    let err = loader
        .validation(port_range(1, 1023))
        .args(Vec::<String>::new())
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("outside 1..=1023"), "got: {err}");
}

#[test]
fn test_custom_spec_with_bad_payload_is_unresolved() {
    let registry = registry(&[&PortRange]);
    let spec = ValidationSpec::Custom(CustomSpec::new("port_range", json!("wide")));
    match registry.validation.build(&spec).unwrap_err() {
        Error::NoApplicableStrategy { registry, available, .. } => {
            assert_eq!(registry, "validation");
            assert_eq!(available[0], "port_range");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fallback_catches_custom_interpolation() {
    let fixture = ConfigFixture::new().with_file("a.json", r#"{"name": "quiet"}"#);
    let config = ConfigLoader::new()
        .registry(registry(&[&ShoutFallback]))
        .file(fixture.path("a.json"))
        .interpolation(InterpolationSpec::Custom(CustomSpec::new("anything", Value::Null)))
        .args(Vec::<String>::new())
        .load()
        .unwrap();
    assert_eq!(config, json!({"NAME": "QUIET"}));
}

#[test]
fn test_fallback_never_shadows_builtins() {
    let registry = registry(&[&ShoutFallback]);
    let op = registry
        .interpolation
        .build(&InterpolationSpec::Absent)
        .unwrap();
    assert_eq!(op.call("quiet".into()).unwrap(), "quiet");
    assert_eq!(registry.interpolation.labels().last().map(String::as_str), Some("shout"));
}
