//! Per-invocation side channel shared by the stages of one pipeline run
//!
//! A [`Context`] maps an operator's identity to a bag of attributes. Stages
//! composed with [`crate::Operator::then`] see the same context, which is how
//! a downstream stage reads what an upstream stage's callback stored.
//! Branches of a broadcast or fan-out each work on a [`Context::fork`]; their
//! writes are never merged back into the parent.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of an operator.
///
/// Clones of an operator share their id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(u64);

impl OperatorId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Named, typed values stored for one operator.
#[derive(Clone, Default)]
pub struct Attributes {
    values: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&mut self, name: &'static str, value: T) {
        self.values.insert(name, Arc::new(value));
    }

    /// Fetch the value stored under `name` if it exists and has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.values.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Side-channel state for one top-level invocation.
#[derive(Clone, Default)]
pub struct Context {
    namespaces: HashMap<OperatorId, Attributes>,
    depth: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes stored for `id`, if that operator wrote any.
    pub fn attributes(&self, id: OperatorId) -> Option<&Attributes> {
        self.namespaces.get(&id)
    }

    /// Attributes for `id`, created empty on first access.
    pub fn attributes_mut(&mut self, id: OperatorId) -> &mut Attributes {
        self.namespaces.entry(id).or_default()
    }

    /// Independent child for one branch of a broadcast or fan-out.
    ///
    /// The child starts as a copy of this context. Nothing written to the
    /// child is visible here.
    pub fn fork(&self) -> Context {
        Context {
            namespaces: self.namespaces.clone(),
            depth: self.depth + 1,
        }
    }

    /// Number of forks between this context and the invocation root.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.namespaces.keys().collect();
        ids.sort();
        f.debug_struct("Context")
            .field("depth", &self.depth)
            .field("operators", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn operator_ids_are_unique() {
        let a = OperatorId::next();
        let b = OperatorId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn attributes_round_trip_typed_values() {
        let mut ctx = Context::new();
        let id = OperatorId::next();

        ctx.attributes_mut(id)
            .set("source_path", PathBuf::from("conf/app.json"));

        let stored = ctx.attributes(id).and_then(|a| a.get::<PathBuf>("source_path"));
        assert_eq!(stored, Some(&PathBuf::from("conf/app.json")));

        // Wrong type yields nothing rather than panicking
        assert!(ctx.attributes(id).unwrap().get::<String>("source_path").is_none());
    }

    #[test]
    fn fork_does_not_leak_writes_into_parent() {
        let mut parent = Context::new();
        let id = OperatorId::next();
        parent.attributes_mut(id).set("value", 1_u32);

        let mut child = parent.fork();
        assert_eq!(child.depth(), 1);
        assert_eq!(child.attributes(id).unwrap().get::<u32>("value"), Some(&1));

        child.attributes_mut(id).set("value", 2_u32);
        child.attributes_mut(OperatorId::next()).set("other", true);

        assert_eq!(parent.attributes(id).unwrap().get::<u32>("value"), Some(&1));
        assert_eq!(parent.depth(), 0);
    }

    #[test]
    fn unknown_operator_has_no_attributes() {
        let ctx = Context::new();
        assert!(ctx.attributes(OperatorId::next()).is_none());
    }
}
