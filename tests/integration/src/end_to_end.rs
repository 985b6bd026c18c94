//! End-to-end loading scenarios
//!
//! Each test writes real files into a temporary directory and runs the full
//! pipeline: path validation, reading, interpolation, parsing, section
//! selection, command line overlays, aggregation and validation.
//!
//! Environment-dependent cases use `InterpolationSpec::Variables` so tests
//! never mutate the process environment.

use cfgweave::{
    AggregationSpec, CliOptions, ConfigLoader, Error, InterpolationSpec, LoadOptions,
    MissingPolicy, ParsingSpec, SectionSpec, Segment, Shape, ValidationSpec, get_config,
};
use cfgweave_test_utils::ConfigFixture;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};

fn no_args() -> Vec<String> {
    Vec::new()
}

fn ban(value: Option<&str>) -> InterpolationSpec {
    InterpolationSpec::variables(value.map(|v| ("BAN", v)), MissingPolicy::Raise)
}

// =============================================================================
// Declared files
// =============================================================================

#[test]
fn test_json_file_alone() {
    let fixture = ConfigFixture::new().with_override_pair();
    let config = ConfigLoader::new()
        .file(fixture.path("test.json"))
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, json!({"foo": "bar", "hax": "ban"}));
}

#[rstest]
#[case(None, json!({"foo": "bar", "hax": 2}))]
#[case(Some("1"), json!({"foo": "bar", "hax": 1}))]
fn test_override_pair(#[case] env: Option<&str>, #[case] expected: serde_json::Value) {
    let fixture = ConfigFixture::new().with_override_pair();
    let config = ConfigLoader::new()
        .files(fixture.paths(&["test.json", "test_override.json"]))
        .interpolation(ban(env))
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, expected);
}

#[rstest]
#[case("conf.json", r#"{"a": {"b": 1}}"#)]
#[case("conf.yaml", "a:\n  b: 1\n")]
#[case("conf.yml", "a: {b: 1}\n")]
#[case("conf.toml", "[a]\nb = 1\n")]
#[case("conf.tml", "a.b = 1\n")]
#[case("CONF.JSON", r#"{"a": {"b": 1}}"#)]
fn test_every_format_decodes_the_same_document(#[case] name: &str, #[case] content: &str) {
    let fixture = ConfigFixture::new().with_file(name, content);
    let config = ConfigLoader::new()
        .file(fixture.path(name))
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, json!({"a": {"b": 1}}));
}

#[test]
fn test_ini_and_xml_values_are_strings() {
    let fixture = ConfigFixture::new()
        .with_file("a.cfg", "[a]\nb = 1\n")
        .with_file("c.xml", "<config><c><d>2</d></c></config>");
    let config = ConfigLoader::new()
        .files(fixture.paths(&["a.cfg", "c.xml"]))
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, json!({"a": {"b": "1"}, "c": {"d": "2"}}));
}

#[test]
fn test_explicit_format_overrides_suffix() {
    let fixture = ConfigFixture::new().with_file("settings.conf", "a: 1\n");
    let config = ConfigLoader::new()
        .file(fixture.path("settings.conf"))
        .parsing(ParsingSpec::format("yaml"))
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, json!({"a": 1}));
}

#[test]
fn test_unknown_suffix_is_reported() {
    let fixture = ConfigFixture::new().with_file("settings.conf", "a: 1\n");
    let err = ConfigLoader::new()
        .file(fixture.path("settings.conf"))
        .args(no_args())
        .load()
        .unwrap_err();
    match err {
        Error::UnsupportedFileExtension { extension, known } => {
            assert_eq!(extension, ".conf");
            assert!(known.contains(&".json".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sequences_concatenate_in_declaration_order() {
    let fixture = ConfigFixture::new()
        .with_file("a.json", "[1, 2]")
        .with_file("b.yaml", "- 3\n");
    let config = ConfigLoader::new()
        .files(fixture.paths(&["a.json", "b.yaml"]))
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, json!([1, 2, 3]));
}

#[test]
fn test_mixed_shapes_fail() {
    let fixture = ConfigFixture::new()
        .with_file("a.json", r#"{"a": 1}"#)
        .with_file("b.json", "[1, 2]");
    let err = ConfigLoader::new()
        .files(fixture.paths(&["a.json", "b.json"]))
        .args(no_args())
        .load()
        .unwrap_err();
    assert!(matches!(err, Error::AggregationFailure { .. }));
}

// =============================================================================
// Command line overlays
// =============================================================================

#[rstest]
#[case(&["+section", "\"value\""], json!({"base": true, "section": "value"}))]
#[case(&["+section.subsection", "\"value\""], json!({"base": true, "section": {"subsection": "value"}}))]
#[case(&["+base", "false"], json!({"base": false}))]
#[case(&["/", "+base", "false"], json!({"base": true}))]
fn test_key_overlays(#[case] args: &[&str], #[case] expected: serde_json::Value) {
    let fixture = ConfigFixture::new().with_file("base.json", r#"{"base": true}"#);
    let config = ConfigLoader::new()
        .file(fixture.path("base.json"))
        .args(args.iter().copied())
        .load()
        .unwrap();
    assert_eq!(config, expected);
}

#[test]
fn test_named_section_and_file_overlay() {
    let fixture = ConfigFixture::new()
        .with_file("base.json", r#"{"a": 1, "b": 1, "c": 1}"#)
        .with_file("extra.yaml", "b: 2\nc: 2\n");
    let extra = format!("++{}", fixture.path("extra.yaml").display());
    let config = ConfigLoader::new()
        .file(fixture.path("base.json"))
        .cli(CliOptions::default().section("config"))
        .args(["run", "+a", "9", "config", extra.as_str(), "+c", "3", "/", "+a", "7"])
        .load()
        .unwrap();
    assert_eq!(config, json!({"a": 1, "b": 2, "c": 3}));
}

#[test]
fn test_overlay_file_goes_through_interpolation() {
    let fixture = ConfigFixture::new()
        .with_file("base.json", r#"{"port": 1}"#)
        .with_file("over.json", r#"{"port": ${PORT:2}}"#);
    let over = format!("++{}", fixture.path("over.json").display());
    let config = ConfigLoader::new()
        .file(fixture.path("base.json"))
        .interpolation(InterpolationSpec::variables([("PORT", "3")], MissingPolicy::Raise))
        .args([over])
        .load()
        .unwrap();
    assert_eq!(config, json!({"port": 3}));
}

#[test]
fn test_malformed_overlay_value_aborts_the_load() {
    let fixture = ConfigFixture::new().with_file("base.json", r#"{"a": 1}"#);
    let err = ConfigLoader::new()
        .file(fixture.path("base.json"))
        .args(["+a", "not json"])
        .load()
        .unwrap_err();
    assert!(matches!(err, Error::OverlayValue { .. }));
}

#[test]
fn test_missing_overlay_file() {
    let fixture = ConfigFixture::new().with_file("base.json", "{}");
    let err = ConfigLoader::new()
        .file(fixture.path("base.json"))
        .args([format!("++{}", fixture.path("gone.json").display())])
        .load()
        .unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

// =============================================================================
// Sections, aggregation and validation
// =============================================================================

#[test]
fn test_deep_merge_of_sections() {
    let fixture = ConfigFixture::new()
        .with_file("a.yaml", "app:\n  db:\n    host: a\n    port: 1\n")
        .with_file("b.toml", "[app.db]\nport = 2\n");
    let config = ConfigLoader::new()
        .files(fixture.paths(&["a.yaml", "b.toml"]))
        .section(SectionSpec::Path(vec![Segment::from("app"), Segment::from("db")]))
        .aggregation(AggregationSpec::DeepMerge)
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, json!({"host": "a", "port": 2}));
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Database {
    host: String,
    port: u16,
    #[serde(default)]
    replicas: Vec<String>,
}

#[test]
fn test_shape_validation_normalises_the_result() {
    let fixture = ConfigFixture::new().with_file("db.json", r#"{"host": "h", "port": 5432}"#);
    let config = ConfigLoader::new()
        .file(fixture.path("db.json"))
        .validation(ValidationSpec::Shape(Shape::of::<Database>()))
        .args(no_args())
        .load()
        .unwrap();
    assert_eq!(config, json!({"host": "h", "port": 5432, "replicas": []}));
}

#[test]
fn test_shape_validation_rejects_wrong_types() {
    let fixture = ConfigFixture::new().with_file("db.json", r#"{"host": "h", "port": "high"}"#);
    let err = ConfigLoader::new()
        .file(fixture.path("db.json"))
        .validation(ValidationSpec::Shape(Shape::of::<Database>()))
        .args(no_args())
        .load()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn test_configure_injects_config_and_call_time_values() {
    let fixture = ConfigFixture::new().with_file("db.yaml", "host: h\nport: 1\n");
    let connect = ConfigLoader::new()
        .file(fixture.path("db.yaml"))
        .args(["+port", "2"])
        .configure(|db: Database| format!("{}:{}", db.host, db.port));

    assert_eq!(connect.call(Map::new()).unwrap(), "h:2");

    let mut kwargs = Map::new();
    kwargs.insert("port".into(), json!(3));
    assert_eq!(connect.call(kwargs).unwrap(), "h:3");
}

#[test]
fn test_get_config_with_options() {
    let fixture = ConfigFixture::new().with_file("a.json", r#"{"x": {"y": "${NOPE}"}}"#);
    let options = LoadOptions {
        interpolation: InterpolationSpec::variables([("A", "1")], MissingPolicy::Blank),
        section: SectionSpec::key("x"),
        ..LoadOptions::default()
    };
    let config = get_config([fixture.path("a.json")], options).unwrap();
    assert_eq!(config, json!({"y": ""}));
}
