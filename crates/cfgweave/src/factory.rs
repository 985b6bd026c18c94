//! Spec-resolving factories
//!
//! A [`Factory`] turns one stage's spec value into an [`Operator`] by
//! resolving a builder through a [`StrategyRegistry`]. Builders receive the
//! factory itself so nested specs resolve through the same registry.

use std::fmt;
use std::sync::Arc;

use cfgweave_core::{Error, Operator, Priority, Result, StrategyRegistry};

/// Builds an operator from a spec.
pub type Builder<S, I, O, R> =
    Arc<dyn Fn(&S, &Factory<S, I, O, R>) -> Result<Operator<I, O>> + Send + Sync>;

/// Strategy registry for one pipeline stage, plus the resources its
/// builders share.
pub struct Factory<S, I, O, R = ()> {
    strategies: StrategyRegistry<S, Builder<S, I, O, R>>,
    resources: R,
}

impl<S, I, O, R: Clone> Clone for Factory<S, I, O, R> {
    fn clone(&self) -> Self {
        Self {
            strategies: self.strategies.clone(),
            resources: self.resources.clone(),
        }
    }
}

impl<S: fmt::Debug, I: 'static, O: 'static, R> Factory<S, I, O, R> {
    pub fn new(name: impl Into<String>, resources: R) -> Self {
        Self {
            strategies: StrategyRegistry::new(name),
            resources,
        }
    }

    /// Add a strategy: builds with `builder` when `predicate` accepts the spec.
    pub fn register<P, B>(
        &mut self,
        label: impl Into<String>,
        predicate: P,
        builder: B,
        priority: Priority,
    ) -> &mut Self
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
        B: Fn(&S, &Self) -> Result<Operator<I, O>> + Send + Sync + 'static,
    {
        self.strategies
            .register(label, predicate, Arc::new(builder), priority);
        self
    }

    /// Add a strategy for the specs `extract` recognises; the builder receives
    /// what `extract` pulled out of the spec.
    pub fn register_variant<T, E, B>(
        &mut self,
        label: impl Into<String>,
        extract: E,
        builder: B,
        priority: Priority,
    ) -> &mut Self
    where
        E: Fn(&S) -> Option<T> + Send + Sync + 'static,
        B: Fn(T, &Self) -> Result<Operator<I, O>> + Send + Sync + 'static,
    {
        let label = label.into();
        let strategy = label.clone();
        let extract = Arc::new(extract);
        let recognise = Arc::clone(&extract);
        self.register(
            label,
            move |spec: &S| recognise(spec).is_some(),
            move |spec: &S, factory: &Self| match extract(spec) {
                Some(parts) => builder(parts, factory),
                None => Err(Error::NoApplicableStrategy {
                    registry: factory.name().to_string(),
                    spec: format!("{spec:?}"),
                    available: vec![strategy.clone()],
                }),
            },
            priority,
        )
    }

    /// Set the strategy used when no predicate accepts the spec.
    pub fn register_fallback<B>(&mut self, label: impl Into<String>, builder: B) -> &mut Self
    where
        B: Fn(&S, &Self) -> Result<Operator<I, O>> + Send + Sync + 'static,
    {
        self.strategies.register_fallback(label, Arc::new(builder));
        self
    }

    /// Resolve `spec` and build its operator.
    pub fn build(&self, spec: &S) -> Result<Operator<I, O>> {
        let builder = self.strategies.resolve(spec)?;
        let operator = builder(spec, self)?;
        tracing::debug!(
            factory = self.strategies.name(),
            operator = operator.name(),
            "Built operator"
        );
        Ok(operator)
    }

    pub fn name(&self) -> &str {
        self.strategies.name()
    }

    /// Strategy labels in resolution order.
    pub fn labels(&self) -> Vec<String> {
        self.strategies.labels()
    }

    pub fn describe(&self) -> Vec<String> {
        self.strategies.describe()
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }
}

impl<S, I, O, R> fmt::Debug for Factory<S, I, O, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("strategies", &self.strategies)
            .finish_non_exhaustive()
    }
}
