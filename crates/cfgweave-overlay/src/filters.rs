//! Token filters selecting file and key overlays

use std::path::PathBuf;

use cfgweave_core::{Context, Result, Stage};

use crate::constants::{DEFAULT_FILE_PREFIX, DEFAULT_KEY_PREFIX};
use crate::trigger::PrefixTrigger;

/// Keeps `++path` tokens and yields the paths.
#[derive(Debug, Clone)]
pub struct FileOverlayFilter {
    trigger: PrefixTrigger,
}

impl FileOverlayFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            trigger: PrefixTrigger::new(prefix),
        }
    }

    pub fn select(&self, tokens: &[String]) -> Vec<PathBuf> {
        tokens
            .iter()
            .filter_map(|token| self.trigger.strip(token))
            .map(PathBuf::from)
            .collect()
    }
}

impl Default for FileOverlayFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_PREFIX)
    }
}

impl Stage<Vec<String>, Vec<PathBuf>> for FileOverlayFilter {
    fn apply(&self, _ctx: &mut Context, tokens: Vec<String>) -> Result<Vec<PathBuf>> {
        let paths = self.select(&tokens);
        tracing::debug!(count = paths.len(), "Selected file overlays");
        Ok(paths)
    }

    fn name(&self) -> &str {
        "file_overlays"
    }
}

/// Keeps `(+key, value)` pairs of consecutive tokens and strips the prefix
/// from the key.
#[derive(Debug, Clone)]
pub struct KeyValueFilter {
    trigger: PrefixTrigger,
}

impl KeyValueFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            trigger: PrefixTrigger::new(prefix),
        }
    }

    pub fn select(&self, tokens: &[String]) -> Vec<(String, String)> {
        if let Some(last) = tokens.last() {
            if self.trigger.matches(last) {
                tracing::warn!(token = %last, "Key overlay has no value and is ignored");
            }
        }
        tokens
            .windows(2)
            .filter_map(|pair| {
                let key = self.trigger.strip(&pair[0])?;
                Some((key.to_string(), pair[1].clone()))
            })
            .collect()
    }
}

impl Default for KeyValueFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl Stage<Vec<String>, Vec<(String, String)>> for KeyValueFilter {
    fn apply(&self, _ctx: &mut Context, tokens: Vec<String>) -> Result<Vec<(String, String)>> {
        let pairs = self.select(&tokens);
        tracing::debug!(count = pairs.len(), "Selected key overlays");
        Ok(pairs)
    }

    fn name(&self) -> &str {
        "key_overlays"
    }
}
