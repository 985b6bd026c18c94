//! Composable configuration loading
//!
//! Loads configuration from any number of files in JSON, YAML, TOML, INI or
//! XML, interpolates `${NAME:default}` references, merges the files with
//! command line overlays and validates the result.
//!
//! Each pipeline stage is configured by a spec value ([`InterpolationSpec`],
//! [`ParsingSpec`], [`SectionSpec`], [`AggregationSpec`],
//! [`ValidationSpec`]) that the stage's factory in the [`Registry`] resolves
//! to an operator. Plugins add strategies to those factories.
//!
//! # Example
//!
//! ```no_run
//! use cfgweave::{AggregationSpec, ConfigLoader};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Settings {
//!     host: String,
//!     port: u16,
//! }
//!
//! // `app +port 8081` on the command line overrides both files
//! let settings: Settings = ConfigLoader::new()
//!     .files(["defaults.toml", "local.yaml"])
//!     .aggregation(AggregationSpec::DeepMerge)
//!     .load_as()?;
//! # Ok::<(), cfgweave::Error>(())
//! ```

pub mod aggregation;
pub mod constants;
pub mod factory;
pub mod fs;
pub mod interpolation;
pub mod loader;
pub mod parsing;
pub mod registry;
pub mod section;
pub mod spec;
pub mod validation;

pub use aggregation::{Aggregator, AggregatorFactory, MergeMode};
pub use cfgweave_core::{Context, Error, Operator, Priority, Result, Stage};
pub use cfgweave_overlay::CliOptions;
pub use factory::{Builder, Factory};
pub use fs::{FileReader, PathValidator};
pub use interpolation::{Interpolator, InterpolatorFactory, Substitutions};
pub use loader::{
    ConfigLoader, Configured, LoadOptions, build_config_merger, build_file_pipeline, get_config,
};
pub use parsing::{FormatStage, InferredParser, ParserFactory};
pub use registry::{Plugin, Registry};
pub use section::{SectionSelector, SectionSelectorFactory};
pub use spec::{
    AggregationSpec, Callable, CustomSpec, InterpolationSpec, MissingPolicy, ParsingSpec, Segment,
    SectionSpec, SourceRef, ValidationSpec,
};
pub use validation::{Shape, ValidatorFactory, coerce};
