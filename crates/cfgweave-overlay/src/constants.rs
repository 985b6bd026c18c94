//! Default overlay grammar

/// Prefix marking an extra configuration file, as in `++extra.yaml`.
pub const DEFAULT_FILE_PREFIX: &str = "++";

/// Prefix marking a key overlay, as in `+db.port 5432`.
pub const DEFAULT_KEY_PREFIX: &str = "+";

/// Separator between key path segments.
pub const DEFAULT_KEY_DELIMITER: &str = ".";

/// Token closing the overlay section.
pub const DEFAULT_SECTION_END: &str = "/";
