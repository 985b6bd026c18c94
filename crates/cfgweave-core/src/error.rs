//! Error types for cfgweave-core
//!
//! Every pipeline stage shares the [`crate::Stage::apply`] signature, so the
//! load-time error kinds of all stages live here.

use std::path::PathBuf;

/// Result type for cfgweave operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registry entry accepted the given spec or key
    #[error(
        "No applicable strategy in {registry} for {spec}; available strategies: [{}]",
        available.join(", ")
    )]
    NoApplicableStrategy {
        registry: String,
        spec: String,
        available: Vec<String>,
    },

    /// A section selector path is absent from the parsed structure
    #[error("Section {section} not found; available keys: [{}]", available.join(", "))]
    SectionNotFound {
        section: String,
        available: Vec<String>,
    },

    /// Interpolation found variables it could not resolve
    #[error("Missing environment variables: {}", names.join(", "))]
    MissingEnvironmentVariable { names: Vec<String> },

    /// Fragment shapes cannot be merged
    #[error("Aggregation failed: {message}")]
    AggregationFailure { message: String },

    /// No decoder is registered for a file suffix
    #[error("Unsupported file extension {extension}; known extensions: [{}]", known.join(", "))]
    UnsupportedFileExtension { extension: String, known: Vec<String> },

    /// A format had to be inferred from a path without a suffix
    #[error("Cannot infer format of {path}: the path has no extension")]
    NeedsExtension { path: PathBuf },

    /// Validation received data of the wrong shape
    #[error("Invalid configuration for {target}: {message}")]
    InvalidConfig { target: String, message: String },

    /// A declared or overlaid configuration file does not exist
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} content: {message}")]
    Parse { format: String, message: String },

    /// A command line key overlay carried a value the value parser rejected
    #[error("Invalid value for overlay key {key}: {value} ({message})")]
    OverlayValue {
        key: String,
        value: String,
        message: String,
    },

    /// A side-channel attribute was read before its producing stage ran
    #[error("Context attribute {attribute} of operator {operator} was read before it was written")]
    SideChannelUnset { operator: String, attribute: String },

    /// A failure raised by a user supplied function
    #[error("{operator} failed: {message}")]
    Custom { operator: String, message: String },
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn custom(operator: impl Into<String>, message: impl ToString) -> Self {
        Self::Custom {
            operator: operator.into(),
            message: message.to_string(),
        }
    }

    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::AggregationFailure {
            message: message.into(),
        }
    }

    pub fn invalid_config(target: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidConfig {
            target: target.into(),
            message: message.to_string(),
        }
    }
}
