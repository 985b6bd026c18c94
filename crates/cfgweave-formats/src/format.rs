//! Format detection and parser trait

use std::fmt;

use cfgweave_core::{Error, Result};
use serde_json::Value;

/// Built-in configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    Toml,
    Ini,
    Xml,
}

impl Format {
    /// All built-in formats, in registration order.
    pub const ALL: [Format; 5] = [
        Format::Json,
        Format::Yaml,
        Format::Toml,
        Format::Ini,
        Format::Xml,
    ];

    /// Detect format from a file extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" | "tml" => Some(Self::Toml),
            "ini" | "cfg" => Some(Self::Ini),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// Default file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
            Self::Toml => &["toml", "tml"],
            Self::Ini => &["ini", "cfg"],
            Self::Xml => &["xml"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Ini => "INI",
            Self::Xml => "XML",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoder from configuration text into a value tree
pub trait FormatParser: Send + Sync {
    /// Human-readable format name used in errors and listings
    fn name(&self) -> &str;

    /// Parse source text
    fn parse(&self, source: &str) -> Result<Value>;

    /// Serialize a value back into this format, where the format supports it
    fn render(&self, value: &Value) -> Result<String> {
        let _ = value;
        Err(Error::parse(
            self.name(),
            "rendering is not supported for this format",
        ))
    }
}
