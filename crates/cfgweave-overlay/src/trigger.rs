//! Token triggers

use std::fmt;
use std::sync::Arc;

/// Matches tokens that start with a prefix not followed by any of the
/// prefix's own characters.
///
/// With prefix `+`, `+key` matches but `++file` does not; with prefix `++`,
/// `++file` matches but `+++file` does not. A token equal to the prefix
/// matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTrigger {
    prefix: String,
}

impl PrefixTrigger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, token: &str) -> bool {
        self.strip(token).is_some()
    }

    /// The token with exactly the prefix removed, if the token matches.
    pub fn strip<'a>(&self, token: &'a str) -> Option<&'a str> {
        let rest = token.strip_prefix(self.prefix.as_str())?;
        match rest.chars().next() {
            Some(next) if self.prefix.contains(next) => None,
            _ => Some(rest),
        }
    }
}

/// Predicate over a single command line token.
#[derive(Clone)]
pub enum Trigger {
    Always,
    Never,
    Equals(String),
    Prefix(PrefixTrigger),
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Trigger {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(PrefixTrigger::new(prefix))
    }

    pub fn equals(token: impl Into<String>) -> Self {
        Self::Equals(token.into())
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    pub fn matches(&self, token: &str) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Equals(expected) => token == expected,
            Self::Prefix(trigger) => trigger.matches(token),
            Self::Custom(predicate) => predicate(token),
        }
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Never => f.write_str("Never"),
            Self::Equals(token) => f.debug_tuple("Equals").field(token).finish(),
            Self::Prefix(trigger) => f.debug_tuple("Prefix").field(&trigger.prefix).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
