//! File formats for cfgweave
//!
//! Each supported format is a [`FormatParser`] turning text into a
//! `serde_json::Value`. The [`FormatRegistry`] maps file extensions to
//! parsers and is open to user-registered formats.
//!
//! | Format | Extensions      | Decoder      |
//! |--------|-----------------|--------------|
//! | JSON   | `.json`         | serde_json   |
//! | YAML   | `.yaml`, `.yml` | serde_yaml   |
//! | TOML   | `.toml`, `.tml` | toml         |
//! | INI    | `.ini`, `.cfg`  | rust-ini     |
//! | XML    | `.xml`          | roxmltree    |

pub mod format;
pub mod handlers;
pub mod registry;

pub use cfgweave_core::{Error, Result};
pub use format::{Format, FormatParser};
pub use handlers::{IniParser, JsonParser, TomlParser, XmlParser, YamlParser};
pub use registry::FormatRegistry;
