//! Parser resolution
//!
//! Parsers receive only the file text. When the format has to be inferred
//! from the file's suffix, the path travels through the [`Context`]: the
//! operator producing the path stores it under [`SOURCE_PATH_ATTRIBUTE`]
//! and the [`InferredParser`] reads it back within the same invocation.

use std::path::PathBuf;

use cfgweave_core::{Context, Error, Operator, Priority, Result, Stage};
use cfgweave_formats::FormatRegistry;
use cfgweave_formats::registry::SharedParser;
use serde_json::Value;

use crate::constants::SOURCE_PATH_ATTRIBUTE;
use crate::factory::Factory;
use crate::spec::{ParsingSpec, SourceRef};

/// Parser factory; builders share the format registry.
pub type ParserFactory = Factory<ParsingSpec, String, Value, FormatRegistry>;

/// Parses with one fixed format.
#[derive(Clone)]
pub struct FormatStage {
    parser: SharedParser,
}

impl FormatStage {
    pub fn new(parser: SharedParser) -> Self {
        Self { parser }
    }
}

impl Stage<String, Value> for FormatStage {
    fn apply(&self, _ctx: &mut Context, text: String) -> Result<Value> {
        self.parser.parse(&text)
    }

    fn name(&self) -> &str {
        self.parser.name()
    }
}

/// Picks the format from the path recorded by an upstream operator.
#[derive(Clone)]
pub struct InferredParser {
    source: SourceRef,
    formats: FormatRegistry,
}

impl InferredParser {
    pub fn new(source: SourceRef, formats: FormatRegistry) -> Self {
        Self { source, formats }
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }
}

impl Stage<String, Value> for InferredParser {
    fn apply(&self, ctx: &mut Context, text: String) -> Result<Value> {
        let path = ctx
            .attributes(self.source.id)
            .and_then(|attrs| attrs.get::<PathBuf>(SOURCE_PATH_ATTRIBUTE))
            .ok_or_else(|| Error::SideChannelUnset {
                operator: format!("{} ({})", self.source.name, self.source.id),
                attribute: SOURCE_PATH_ATTRIBUTE.to_string(),
            })?;
        let parser = self.formats.for_path(path)?;
        tracing::debug!(path = %path.display(), format = parser.name(), "Inferred format");
        parser.parse(&text)
    }

    fn name(&self) -> &str {
        "inferred_parser"
    }
}

impl ParserFactory {
    /// Factory with the built-in parsing strategies over `formats`.
    pub fn with_formats(formats: FormatRegistry) -> Self {
        let mut factory = Self::new("parsing", formats);
        factory
            .register_variant(
                "operator",
                |spec: &ParsingSpec| match spec {
                    ParsingSpec::Operator(op) => Some(op.clone()),
                    _ => None,
                },
                |op, _: &Self| Ok(op),
                Priority::Rank(10),
            )
            .register_variant(
                "function",
                |spec: &ParsingSpec| match spec {
                    ParsingSpec::Function(f) => Some(f.clone()),
                    _ => None,
                },
                |f, _: &Self| Ok(Operator::from_fn("parse_fn", move |text: String| f(text))),
                Priority::Rank(20),
            )
            .register_variant(
                "format",
                |spec: &ParsingSpec| match spec {
                    ParsingSpec::Format(name) => Some(name.clone()),
                    _ => None,
                },
                |name, factory: &Self| {
                    let parser = factory.resources().for_spec(&name)?;
                    Ok(Operator::new(FormatStage::new(parser)))
                },
                Priority::Rank(30),
            )
            .register_variant(
                "infer_from",
                |spec: &ParsingSpec| match spec {
                    ParsingSpec::InferFrom(source) => Some(source.clone()),
                    _ => None,
                },
                |source, factory: &Self| {
                    Ok(Operator::new(InferredParser::new(
                        source,
                        factory.resources().clone(),
                    )))
                },
                Priority::Rank(40),
            );
        factory
    }

    pub fn with_builtins() -> Self {
        Self::with_formats(FormatRegistry::with_builtins())
    }

    pub fn formats(&self) -> &FormatRegistry {
        self.resources()
    }

    pub fn formats_mut(&mut self) -> &mut FormatRegistry {
        self.resources_mut()
    }

    /// Make `source` record its output path on every invocation and build a
    /// parser that infers the format from that path.
    pub fn infer_from(
        &self,
        source: &mut Operator<PathBuf, PathBuf>,
    ) -> Result<Operator<String, Value>> {
        let id = source.id();
        source.append_callback(move |ctx, path: &PathBuf| {
            ctx.attributes_mut(id).set(SOURCE_PATH_ATTRIBUTE, path.clone());
        });
        self.build(&ParsingSpec::InferFrom(SourceRef::from(&*source)))
    }

    /// Build the parser for `spec`, wiring `source` when the format is
    /// inferred.
    pub fn build_for(
        &self,
        spec: &ParsingSpec,
        source: &mut Operator<PathBuf, PathBuf>,
    ) -> Result<Operator<String, Value>> {
        match spec {
            ParsingSpec::Infer => self.infer_from(source),
            other => self.build(other),
        }
    }
}
