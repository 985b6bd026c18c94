//! Stage specifications
//!
//! Each pipeline stage accepts a spec value describing, loosely, how to build
//! its operator. Every spec has an `Operator` variant for a ready-made
//! operator, a `Function` variant wrapping a plain function, variants for the
//! built-in strategies and a final `Custom` variant that only plugin
//! strategies resolve.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use cfgweave_core::{Operator, OperatorId, Result};
use serde_json::Value;

use crate::validation::Shape;

/// Shared user function with an opaque `Debug` rendering.
pub struct Callable<F: ?Sized>(pub Arc<F>);

impl<F: ?Sized> Clone for Callable<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> Deref for Callable<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

impl<F: ?Sized> fmt::Debug for Callable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<function>")
    }
}

pub type StringFn = Callable<dyn Fn(String) -> Result<String> + Send + Sync>;
pub type ParseFn = Callable<dyn Fn(String) -> Result<Value> + Send + Sync>;
pub type ValueFn = Callable<dyn Fn(Value) -> Result<Value> + Send + Sync>;
pub type AggregateFn = Callable<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// Spec understood only by plugin strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSpec {
    pub tag: String,
    pub payload: Value,
}

impl CustomSpec {
    pub fn new(tag: impl Into<String>, payload: Value) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }
}

/// What interpolation does with a `${NAME}` reference it cannot resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Fail the load with `MissingEnvironmentVariable`.
    #[default]
    Raise,
    /// Log a warning and leave the reference in place.
    Warn,
    /// Leave the reference in place.
    Ignore,
    /// Substitute an empty string.
    Blank,
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raise" | "error" => Ok(Self::Raise),
            "warn" => Ok(Self::Warn),
            "ignore" => Ok(Self::Ignore),
            "blank" => Ok(Self::Blank),
            other => Err(format!(
                "unknown missing-variable policy '{other}' (expected raise, warn, ignore or blank)"
            )),
        }
    }
}

/// How file text is interpolated before parsing.
#[derive(Debug, Clone)]
pub enum InterpolationSpec {
    /// No interpolation.
    Absent,
    Operator(Operator<String, String>),
    Function(StringFn),
    /// Substitute from the process environment.
    Environment(MissingPolicy),
    /// Substitute from a fixed map.
    Variables {
        values: BTreeMap<String, String>,
        on_missing: MissingPolicy,
    },
    /// Apply each sub-spec in order.
    Chain(Vec<InterpolationSpec>),
    Custom(CustomSpec),
}

impl Default for InterpolationSpec {
    fn default() -> Self {
        Self::Environment(MissingPolicy::Raise)
    }
}

impl InterpolationSpec {
    pub fn function<F>(function: F) -> Self
    where
        F: Fn(String) -> Result<String> + Send + Sync + 'static,
    {
        Self::Function(Callable(Arc::new(function)))
    }

    pub fn variables<K, V>(values: impl IntoIterator<Item = (K, V)>, on_missing: MissingPolicy) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Variables {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            on_missing,
        }
    }
}

/// Reference to the operator that produced a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub id: OperatorId,
    pub name: String,
}

impl<I: 'static, O: 'static> From<&Operator<I, O>> for SourceRef {
    fn from(operator: &Operator<I, O>) -> Self {
        Self {
            id: operator.id(),
            name: operator.name().to_string(),
        }
    }
}

/// How file text is decoded.
#[derive(Debug, Clone, Default)]
pub enum ParsingSpec {
    /// Pick the decoder from the suffix of the file being loaded.
    #[default]
    Infer,
    /// Pick the decoder from the path recorded by a given operator.
    InferFrom(SourceRef),
    Operator(Operator<String, Value>),
    Function(ParseFn),
    /// A path or bare extension naming the decoder, e.g. `"yaml"`.
    Format(String),
    Custom(CustomSpec),
}

impl ParsingSpec {
    pub fn format(path_or_extension: impl Into<String>) -> Self {
        Self::Format(path_or_extension.into())
    }

    pub fn function<F>(function: F) -> Self
    where
        F: Fn(String) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Function(Callable(Arc::new(function)))
    }
}

/// One step of a section path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Which part of a parsed file to keep.
#[derive(Debug, Clone, Default)]
pub enum SectionSpec {
    /// The whole document.
    #[default]
    Absent,
    Operator(Operator<Value, Value>),
    Function(ValueFn),
    Key(String),
    Path(Vec<Segment>),
    Custom(CustomSpec),
}

impl SectionSpec {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    pub fn path<S: Into<Segment>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self::Path(segments.into_iter().map(Into::into).collect())
    }

    pub fn function<F>(function: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Function(Callable(Arc::new(function)))
    }
}

/// How fragments are combined.
#[derive(Debug, Clone, Default)]
pub enum AggregationSpec {
    /// Overlay for mappings, concatenation for sequences.
    #[default]
    Infer,
    /// Shallow merge; later fragments win per top-level key.
    Overlay,
    /// Recursive merge of nested mappings; later fragments win per leaf.
    DeepMerge,
    /// Concatenate sequences in order.
    Concat,
    Operator(Operator<Vec<Value>, Value>),
    Function(AggregateFn),
    Custom(CustomSpec),
}

impl AggregationSpec {
    pub fn function<F>(function: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Function(Callable(Arc::new(function)))
    }
}

/// How the aggregated configuration is checked.
#[derive(Debug, Clone, Default)]
pub enum ValidationSpec {
    /// Accept anything.
    #[default]
    Absent,
    Operator(Operator<Value, Value>),
    Function(ValueFn),
    /// Must deserialize into a given type.
    Shape(Shape),
    Custom(CustomSpec),
}

impl ValidationSpec {
    pub fn function<F>(function: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Function(Callable(Arc::new(function)))
    }
}
