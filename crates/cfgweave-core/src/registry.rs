//! Strategy registries
//!
//! A [`StrategyRegistry`] maps a spec value to a handler through ordered
//! predicates: the first entry whose predicate accepts the spec wins. A
//! [`KeyedRegistry`] maps normalised file extensions to handlers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Predicate deciding whether an entry handles a spec.
pub type Predicate<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Where a new entry is placed relative to existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Ahead of every registered entry.
    First,
    /// Behind every registered entry, but ahead of the fallback.
    Last,
    /// Explicit rank; lower ranks are tried first and ties keep insertion order.
    Rank(i32),
}

struct Entry<S, H> {
    label: String,
    rank: i32,
    predicate: Predicate<S>,
    handler: H,
}

impl<S, H: Clone> Clone for Entry<S, H> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            rank: self.rank,
            predicate: Arc::clone(&self.predicate),
            handler: self.handler.clone(),
        }
    }
}

/// Ordered predicate-to-handler table with an optional fallback.
pub struct StrategyRegistry<S, H> {
    name: String,
    entries: Vec<Entry<S, H>>,
    fallback: Option<(String, H)>,
}

impl<S, H: Clone> Clone for StrategyRegistry<S, H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entries: self.entries.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<S: fmt::Debug, H> StrategyRegistry<S, H> {
    /// Create an empty registry; `name` appears in resolution errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            fallback: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an entry at the given priority.
    pub fn register<P>(
        &mut self,
        label: impl Into<String>,
        predicate: P,
        handler: H,
        priority: Priority,
    ) -> &mut Self
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        let rank = match priority {
            Priority::Rank(rank) => rank,
            Priority::First => self.entries.first().map_or(0, |e| e.rank.saturating_sub(1)),
            Priority::Last => self.entries.last().map_or(0, |e| e.rank.saturating_add(1)),
        };
        let position = match priority {
            Priority::First => 0,
            _ => self.entries.partition_point(|e| e.rank <= rank),
        };
        self.entries.insert(
            position,
            Entry {
                label: label.into(),
                rank,
                predicate: Arc::new(predicate),
                handler,
            },
        );
        self
    }

    /// Set the handler tried after every predicate has declined.
    pub fn register_fallback(&mut self, label: impl Into<String>, handler: H) -> &mut Self {
        self.fallback = Some((label.into(), handler));
        self
    }

    /// Handler of the first entry accepting `spec`.
    pub fn resolve(&self, spec: &S) -> Result<&H> {
        if let Some(entry) = self.entries.iter().find(|e| (e.predicate)(spec)) {
            tracing::trace!(registry = %self.name, strategy = %entry.label, "Resolved strategy");
            return Ok(&entry.handler);
        }
        if let Some((label, handler)) = &self.fallback {
            tracing::trace!(registry = %self.name, strategy = %label, "Using fallback strategy");
            return Ok(handler);
        }
        Err(Error::NoApplicableStrategy {
            registry: self.name.clone(),
            spec: format!("{spec:?}"),
            available: self.labels(),
        })
    }

    /// Labels in resolution order, fallback last.
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.label.clone())
            .chain(self.fallback.iter().map(|(label, _)| label.clone()))
            .collect()
    }

    /// One line per entry: rank and label, in resolution order.
    pub fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{:>5}  {}", e.rank, e.label))
            .collect();
        if let Some((label, _)) = &self.fallback {
            lines.push(format!("{:>5}  {}", "*", label));
        }
        lines
    }

    /// Number of entries, not counting the fallback.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.fallback.is_none()
    }
}

impl<S, H> fmt::Debug for StrategyRegistry<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
        f.debug_struct("StrategyRegistry")
            .field("name", &self.name)
            .field("entries", &labels)
            .field("fallback", &self.fallback.as_ref().map(|(l, _)| l))
            .finish()
    }
}

/// Lower-case a file extension and give it exactly one leading dot.
pub fn normalize_extension(key: &str) -> String {
    format!(".{}", key.trim().trim_start_matches('.').to_lowercase())
}

/// Extension-keyed handler table.
#[derive(Clone)]
pub struct KeyedRegistry<H> {
    name: String,
    entries: BTreeMap<String, H>,
}

impl<H> KeyedRegistry<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Register `handler` under `key`, returning the handler it replaced.
    pub fn register(&mut self, key: &str, handler: H) -> Option<H> {
        self.entries.insert(normalize_extension(key), handler)
    }

    pub fn resolve(&self, key: &str) -> Result<&H> {
        let normalized = normalize_extension(key);
        self.entries
            .get(&normalized)
            .ok_or_else(|| Error::NoApplicableStrategy {
                registry: self.name.clone(),
                spec: normalized,
                available: self.keys(),
            })
    }

    pub fn get(&self, key: &str) -> Option<&H> {
        self.entries.get(&normalize_extension(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_extension(key))
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Clone> KeyedRegistry<H> {
    /// Register one handler under several keys.
    pub fn register_all(&mut self, keys: &[&str], handler: H) {
        for key in keys {
            self.register(key, handler.clone());
        }
    }
}

impl<H> fmt::Debug for KeyedRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedRegistry")
            .field("name", &self.name)
            .field("keys", &self.keys())
            .finish()
    }
}
