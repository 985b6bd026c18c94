//! Load orchestration
//!
//! A load builds one file pipeline (validate path, read, interpolate, parse,
//! select section) and runs it over every declared file. The same pipeline
//! handles `++file` overlays from the command line. Fragments are then
//! aggregated in precedence order and validated.

use std::any::type_name;
use std::marker::PhantomData;
use std::path::PathBuf;

use cfgweave_core::{
    Broadcast, Collect, Context, Operator, Result, Stream, concat, from_vec, short_type_name,
};
use cfgweave_overlay::{CliOptions, build_cli_reader, process_args};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::fs::{FileReader, PathValidator};
use crate::registry::Registry;
use crate::spec::{AggregationSpec, InterpolationSpec, ParsingSpec, SectionSpec, ValidationSpec};
use crate::validation::coerce;

/// One spec per stage plus the command line overlay grammar.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub interpolation: InterpolationSpec,
    pub parsing: ParsingSpec,
    pub section: SectionSpec,
    pub aggregation: AggregationSpec,
    pub validation: ValidationSpec,
    pub cli: CliOptions,
}

/// Build the per-file pipeline: path -> fragment.
pub fn build_file_pipeline(
    registry: &Registry,
    options: &LoadOptions,
) -> Result<Operator<PathBuf, Value>> {
    let mut validator = Operator::new(PathValidator);
    let parser = registry.parsing.build_for(&options.parsing, &mut validator)?;
    let interpolator = registry.interpolation.build(&options.interpolation)?;
    let selector = registry.section.build(&options.section)?;

    Ok(validator
        .then(Operator::new(FileReader))
        .then(interpolator)
        .then(parser)
        .then(selector))
}

/// Build the merge step: fragments -> validated configuration.
pub fn build_config_merger(
    registry: &Registry,
    options: &LoadOptions,
) -> Result<Operator<Vec<Value>, Value>> {
    let aggregator = registry.aggregation.build(&options.aggregation)?;
    let validator = registry.validation.build(&options.validation)?;
    Ok(aggregator.then(validator))
}

/// Builder for one configuration load.
///
/// # Example
///
/// ```no_run
/// use cfgweave::{ConfigLoader, SectionSpec};
///
/// let config = ConfigLoader::new()
///     .file("config/base.yaml")
///     .file("config/local.toml")
///     .section(SectionSpec::key("server"))
///     .load()?;
/// # Ok::<(), cfgweave::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    files: Vec<PathBuf>,
    registry: Registry,
    options: LoadOptions,
    args: Option<Vec<String>>,
}

impl ConfigLoader {
    /// Loader with the built-in registry, default options and no files.
    /// Overlay tokens come from the process arguments unless
    /// [`ConfigLoader::args`] is set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn files<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn interpolation(mut self, spec: InterpolationSpec) -> Self {
        self.options.interpolation = spec;
        self
    }

    pub fn parsing(mut self, spec: ParsingSpec) -> Self {
        self.options.parsing = spec;
        self
    }

    pub fn section(mut self, spec: SectionSpec) -> Self {
        self.options.section = spec;
        self
    }

    pub fn aggregation(mut self, spec: AggregationSpec) -> Self {
        self.options.aggregation = spec;
        self
    }

    pub fn validation(mut self, spec: ValidationSpec) -> Self {
        self.options.validation = spec;
        self
    }

    pub fn cli(mut self, cli: CliOptions) -> Self {
        self.options.cli = cli;
        self
    }

    /// Use `args` as the overlay tokens instead of the process arguments.
    pub fn args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn load(&self) -> Result<Value> {
        self.load_with(Vec::new())
    }

    /// Load and deserialize into `T`.
    pub fn load_as<T: DeserializeOwned>(&self) -> Result<T> {
        coerce(self.load()?, short_type_name(type_name::<T>()))
    }

    /// Wrap `function` so each call receives the loaded configuration,
    /// merged with call-time values.
    pub fn configure<T, R, F>(self, function: F) -> Configured<T, F>
    where
        T: DeserializeOwned,
        F: Fn(T) -> R,
    {
        Configured {
            loader: self,
            function,
            target: PhantomData,
        }
    }

    /// Load with `extra` fragments aggregated after every other source.
    fn load_with(&self, extra: Vec<Value>) -> Result<Value> {
        let file_pipeline = build_file_pipeline(&self.registry, &self.options)?;
        let cli_reader = build_cli_reader(&self.options.cli, file_pipeline.clone());
        let declared = Broadcast::new(file_pipeline).into_operator();
        let merger = Collect::operator().then(build_config_merger(&self.registry, &self.options)?);

        let args = self.args.clone().unwrap_or_else(process_args);
        tracing::debug!(
            files = self.files.len(),
            args = args.len(),
            extra = extra.len(),
            "Loading configuration"
        );

        let mut ctx = Context::new();
        let fragments: Stream<Value> = concat(
            concat(
                declared.call_with(&mut ctx, self.files.clone())?,
                cli_reader.call_with(&mut ctx, args)?,
            ),
            from_vec(extra),
        );
        merger.call_with(&mut ctx, fragments)
    }
}

/// A function bound to a configuration load. See [`ConfigLoader::configure`].
pub struct Configured<T, F> {
    loader: ConfigLoader,
    function: F,
    target: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned, F> Configured<T, F> {
    /// Load, overlay `kwargs` with the highest precedence, coerce into `T`
    /// and call the function.
    pub fn call<R>(&self, kwargs: Map<String, Value>) -> Result<R>
    where
        F: Fn(T) -> R,
    {
        let extra = if kwargs.is_empty() {
            Vec::new()
        } else {
            vec![Value::Object(kwargs)]
        };
        let merged = self.loader.load_with(extra)?;
        let config = coerce(merged, short_type_name(type_name::<T>()))?;
        Ok((self.function)(config))
    }

    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }
}

/// Load `files` with the built-in registry and the process arguments.
pub fn get_config<P: Into<PathBuf>>(
    files: impl IntoIterator<Item = P>,
    options: LoadOptions,
) -> Result<Value> {
    ConfigLoader::new().files(files).options(options).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgweave_core::Error;
    use cfgweave_test_utils::ConfigFixture;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    use crate::spec::MissingPolicy;

    fn loader(fixture: &ConfigFixture, names: &[&str]) -> ConfigLoader {
        ConfigLoader::new()
            .files(fixture.paths(names))
            .args(Vec::<String>::new())
    }

    #[test]
    fn test_single_file_is_returned_as_is() {
        let fixture = ConfigFixture::new().with_override_pair();
        let config = loader(&fixture, &["test.json"]).load().unwrap();
        assert_eq!(config, json!({"foo": "bar", "hax": "ban"}));
    }

    #[test]
    fn test_later_files_win_with_interpolated_default() {
        let fixture = ConfigFixture::new().with_override_pair();
        let config = loader(&fixture, &["test.json", "test_override.json"])
            .interpolation(InterpolationSpec::variables(
                std::iter::empty::<(String, String)>(),
                MissingPolicy::Raise,
            ))
            .load()
            .unwrap();
        assert_eq!(config, json!({"foo": "bar", "hax": 2}));
    }

    #[test]
    fn test_mixed_formats() {
        let fixture = ConfigFixture::new()
            .with_file("a.yaml", "name: app\nport: 80\n")
            .with_file("b.toml", "port = 81\n")
            .with_file("c.ini", "[db]\nhost = local\n");
        let config = loader(&fixture, &["a.yaml", "b.toml", "c.ini"]).load().unwrap();
        assert_eq!(
            config,
            json!({"name": "app", "port": 81, "db": {"host": "local"}})
        );
    }

    #[test]
    fn test_cli_overlays_take_precedence() {
        let fixture = ConfigFixture::new()
            .with_file("base.json", r#"{"a": 1, "b": {"c": 1}, "d": 1}"#)
            .with_file("extra.json", r#"{"d": 2}"#);
        let extra = fixture.path("extra.json");
        let config = loader(&fixture, &["base.json"])
            .aggregation(AggregationSpec::DeepMerge)
            .args(vec![
                "serve".to_string(),
                "+b.c".to_string(),
                "3".to_string(),
                format!("++{}", extra.display()),
            ])
            .load()
            .unwrap();
        assert_eq!(config, json!({"a": 1, "b": {"c": 3}, "d": 2}));
    }

    #[test]
    fn test_missing_file_fails_the_load() {
        let fixture = ConfigFixture::new();
        let err = loader(&fixture, &["nope.json"]).load().unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_section_is_selected_per_file() {
        let fixture = ConfigFixture::new()
            .with_file("a.json", r#"{"app": {"x": 1}, "other": 0}"#)
            .with_file("b.json", r#"{"app": {"y": 2}}"#);
        let config = loader(&fixture, &["a.json", "b.json"])
            .section(SectionSpec::key("app"))
            .load()
            .unwrap();
        assert_eq!(config, json!({"y": 2}));
    }

    #[test]
    fn test_no_sources_yield_empty_mapping() {
        let config = ConfigLoader::new().args(Vec::<String>::new()).load().unwrap();
        assert_eq!(config, json!({}));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
    }

    #[test]
    fn test_load_as_typed() {
        let fixture = ConfigFixture::new().with_file("s.yaml", "host: h\nport: 1\n");
        let server: Server = loader(&fixture, &["s.yaml"]).load_as().unwrap();
        assert_eq!(server, Server { host: "h".into(), port: 1 });
    }

    #[test]
    fn test_configure_call_time_values_win() {
        let fixture = ConfigFixture::new().with_file("s.json", r#"{"host": "h", "port": 1}"#);
        let describe = loader(&fixture, &["s.json"])
            .configure(|server: Server| format!("{}:{}", server.host, server.port));

        assert_eq!(describe.call(Map::new()).unwrap(), "h:1");

        let mut kwargs = Map::new();
        kwargs.insert("port".into(), json!(2));
        assert_eq!(describe.call(kwargs).unwrap(), "h:2");
    }

    #[test]
    fn test_configure_reports_wrong_shape() {
        let fixture = ConfigFixture::new().with_file("s.json", r#"{"host": "h"}"#);
        let configured = loader(&fixture, &["s.json"]).configure(|server: Server| server.port);
        assert!(matches!(
            configured.call(Map::new()),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
