//! [`ConfigFixture`] builder for configuration loading scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary directory holding configuration files.
///
/// # Example
///
/// ```rust,no_run
/// use cfgweave_test_utils::ConfigFixture;
///
/// let fixture = ConfigFixture::new()
///     .with_file("base.yaml", "port: 80\n")
///     .with_json("override.json", &serde_json::json!({"port": 81}));
/// let paths = fixture.paths(&["base.yaml", "override.json"]);
/// ```
pub struct ConfigFixture {
    temp_dir: TempDir,
}

impl Default for ConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFixture {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `name` inside the fixture.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Absolute paths of several fixture files, in the given order.
    pub fn paths(&self, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| self.path(name)).collect()
    }

    /// Write `content` to `name`, creating parent directories.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Could not write fixture {}: {e}", path.display()));
        path
    }

    /// Builder form of [`ConfigFixture::write`].
    pub fn with_file(self, name: &str, content: &str) -> Self {
        self.write(name, content);
        self
    }

    /// Write `value` as pretty-printed JSON.
    pub fn with_json(self, name: &str, value: &Value) -> Self {
        let content = serde_json::to_string_pretty(value).unwrap();
        self.with_file(name, &content)
    }

    /// Write the two-file scenario used across the end-to-end suites:
    /// `test.json` with two keys and `test_override.json` overriding one of
    /// them through a `${BAN:2}` reference.
    pub fn with_override_pair(self) -> Self {
        self.with_file("test.json", r#"{"foo": "bar", "hax": "ban"}"#)
            .with_file("test_override.json", r#"{"hax": ${BAN:2}}"#)
    }

    /// Assert that `name` exists inside the fixture.
    ///
    /// # Panics
    /// Panics with a descriptive message if the file does not exist.
    pub fn assert_file_exists(&self, name: &str) {
        let path = self.path(name);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }
}
