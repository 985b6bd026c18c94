//! Extension-keyed registry of format parsers

use std::path::Path;
use std::sync::Arc;

use cfgweave_core::{Error, KeyedRegistry, Result};
use serde_json::Value;

use crate::format::{Format, FormatParser};
use crate::handlers::{IniParser, JsonParser, TomlParser, XmlParser, YamlParser};

/// Parser shared between registries and the pipelines built from them.
pub type SharedParser = Arc<dyn FormatParser>;

/// Registry mapping file extensions to parsers.
///
/// Extensions are matched case-insensitively, with or without the dot.
#[derive(Clone, Debug)]
pub struct FormatRegistry {
    parsers: KeyedRegistry<SharedParser>,
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            parsers: KeyedRegistry::new("formats"),
        }
    }

    /// Registry with JSON, YAML, TOML, INI and XML registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for format in Format::ALL {
            let parser: SharedParser = match format {
                Format::Json => Arc::new(JsonParser::new()),
                Format::Yaml => Arc::new(YamlParser::new()),
                Format::Toml => Arc::new(TomlParser::new()),
                Format::Ini => Arc::new(IniParser::new()),
                Format::Xml => Arc::new(XmlParser::new()),
            };
            registry.register_shared(format.extensions(), parser);
        }
        registry
    }

    /// Register `parser` under each of `extensions`, replacing earlier entries.
    pub fn register(&mut self, extensions: &[&str], parser: impl FormatParser + 'static) {
        self.register_shared(extensions, Arc::new(parser));
    }

    pub fn register_shared(&mut self, extensions: &[&str], parser: SharedParser) {
        for ext in extensions {
            if self.parsers.register(ext, Arc::clone(&parser)).is_some() {
                tracing::debug!(extension = %ext, parser = parser.name(), "Replaced format parser");
            }
        }
    }

    /// Parser registered for an extension.
    pub fn for_extension(&self, extension: &str) -> Result<SharedParser> {
        self.parsers
            .get(extension)
            .cloned()
            .ok_or_else(|| Error::UnsupportedFileExtension {
                extension: cfgweave_core::normalize_extension(extension),
                known: self.extensions(),
            })
    }

    /// Parser for a file path, chosen by its suffix.
    pub fn for_path(&self, path: &Path) -> Result<SharedParser> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::NeedsExtension {
                path: path.to_path_buf(),
            })?;
        self.for_extension(extension)
    }

    /// Parser for a user-supplied spec that is either a path or a bare
    /// extension such as `"yaml"` or `".yaml"`.
    pub fn for_spec(&self, spec: &str) -> Result<SharedParser> {
        let path = Path::new(spec);
        if path.extension().is_some() {
            return self.for_path(path);
        }
        if spec.trim().is_empty() || spec.chars().any(std::path::is_separator) {
            return Err(Error::NeedsExtension {
                path: path.to_path_buf(),
            });
        }
        self.for_extension(spec)
    }

    /// Parse `source`, choosing the parser from `path`.
    pub fn parse_path(&self, path: &Path, source: &str) -> Result<Value> {
        self.for_path(path)?.parse(source)
    }

    /// Registered extensions, sorted, each with its leading dot.
    pub fn extensions(&self) -> Vec<String> {
        self.parsers.keys()
    }

    /// `(extension, parser name)` pairs, sorted by extension.
    pub fn describe(&self) -> Vec<(String, String)> {
        self.parsers
            .keys()
            .into_iter()
            .filter_map(|ext| {
                let name = self.parsers.get(&ext)?.name().to_string();
                Some((ext, name))
            })
            .collect()
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.parsers.contains(extension)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
