//! Format handlers

mod ini;
mod json;
mod toml;
mod xml;
mod yaml;

pub use self::ini::IniParser;
pub use self::json::JsonParser;
pub use self::toml::TomlParser;
pub use self::xml::XmlParser;
pub use self::yaml::YamlParser;
