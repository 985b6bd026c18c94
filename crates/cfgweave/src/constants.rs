//! Loader defaults

pub use cfgweave_overlay::constants::{
    DEFAULT_FILE_PREFIX, DEFAULT_KEY_DELIMITER, DEFAULT_KEY_PREFIX, DEFAULT_SECTION_END,
};

/// `${NAME}` or `${NAME:default}`.
pub const INTERPOLATION_PATTERN: &str = r"\$\{(?P<variable>\w+)(?::(?P<default_value>[^}:]+))?\}";

/// Attribute under which a path-producing operator records its last output.
pub const SOURCE_PATH_ATTRIBUTE: &str = "source_path";
