//! File stages of the per-file pipeline

use std::fs;
use std::path::PathBuf;

use cfgweave_core::{Context, Error, Result, Stage};

/// Passes a path through if it names an existing regular file.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathValidator;

impl Stage<PathBuf, PathBuf> for PathValidator {
    fn apply(&self, _ctx: &mut Context, path: PathBuf) -> Result<PathBuf> {
        if path.as_os_str().is_empty() || !path.is_file() {
            return Err(Error::ConfigNotFound { path });
        }
        Ok(path)
    }

    fn name(&self) -> &str {
        "validate_path"
    }
}

/// Reads a file as UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileReader;

impl Stage<PathBuf, String> for FileReader {
    fn apply(&self, _ctx: &mut Context, path: PathBuf) -> Result<String> {
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "Read configuration file");
        Ok(text)
    }

    fn name(&self) -> &str {
        "read_file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgweave_core::Operator;
    use cfgweave_test_utils::ConfigFixture;

    #[test]
    fn test_validator_accepts_existing_file() {
        let fixture = ConfigFixture::new().with_file("a.json", "{}");
        let op = Operator::new(PathValidator);
        assert_eq!(op.call(fixture.path("a.json")).unwrap(), fixture.path("a.json"));
    }

    #[test]
    fn test_validator_rejects_missing_file_and_directories() {
        let fixture = ConfigFixture::new();
        let op = Operator::new(PathValidator);
        for path in [fixture.path("missing.json"), fixture.root().to_path_buf(), PathBuf::new()] {
            assert!(matches!(op.call(path), Err(Error::ConfigNotFound { .. })));
        }
    }

    #[test]
    fn test_reader_returns_text() {
        let fixture = ConfigFixture::new().with_file("a.toml", "x = 1\n");
        let text = Operator::new(FileReader).call(fixture.path("a.toml")).unwrap();
        assert_eq!(text, "x = 1\n");
    }

    #[test]
    fn test_reader_rejects_invalid_utf8() {
        let fixture = ConfigFixture::new();
        let path = fixture.path("bin.json");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            Operator::new(FileReader).call(path),
            Err(Error::Io { .. })
        ));
    }
}
