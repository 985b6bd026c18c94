//! Operators and sequential composition
//!
//! A [`Stage`] is the behaviour: one `apply` from input to output. An
//! [`Operator`] wraps a stage with an identity and a list of post-invocation
//! callbacks, and composes with other operators through [`Operator::then`].

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::context::{Context, OperatorId};
use crate::error::Result;

/// Observer run after every invocation of an operator.
pub type Callback<O> = Arc<dyn Fn(&mut Context, &O) + Send + Sync>;

/// One concrete strategy of a pipeline stage.
pub trait Stage<I, O>: Send + Sync {
    fn apply(&self, ctx: &mut Context, input: I) -> Result<O>;

    fn name(&self) -> &str {
        short_type_name(type_name::<Self>())
    }

    /// Nominal input type, for diagnostics only.
    fn input_type(&self) -> &'static str {
        type_name::<I>()
    }

    /// Nominal output type, for diagnostics only.
    fn output_type(&self) -> &'static str {
        type_name::<O>()
    }
}

/// Strip module paths and generic arguments from a type name.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A composable unit of computation.
pub struct Operator<I, O> {
    id: OperatorId,
    name: Arc<str>,
    stage: Arc<dyn Stage<I, O>>,
    callbacks: Vec<Callback<O>>,
}

impl<I, O> Clone for Operator<I, O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            stage: Arc::clone(&self.stage),
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<I: 'static, O: 'static> Operator<I, O> {
    pub fn new(stage: impl Stage<I, O> + 'static) -> Self {
        let name: Arc<str> = Arc::from(stage.name());
        Self {
            id: OperatorId::next(),
            name,
            stage: Arc::new(stage),
            callbacks: Vec::new(),
        }
    }

    /// Wrap `stage` under an explicit diagnostic name.
    pub fn named(name: impl Into<String>, stage: impl Stage<I, O> + 'static) -> Self {
        let mut op = Self::new(stage);
        op.name = Arc::from(name.into());
        op
    }

    /// Function-backed operator.
    pub fn from_fn<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(I) -> Result<O> + Send + Sync + 'static,
    {
        let name = name.into();
        Self::named(
            name.clone(),
            FnStage {
                name,
                function,
            },
        )
    }

    pub fn id(&self) -> OperatorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_type(&self) -> &'static str {
        self.stage.input_type()
    }

    pub fn output_type(&self) -> &'static str {
        self.stage.output_type()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Register an observer of `(context, result)` for every invocation.
    pub fn append_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Context, &O) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
        self
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Context, &O) + Send + Sync + 'static,
    {
        self.append_callback(callback);
        self
    }

    /// Run on a fresh context.
    pub fn call(&self, input: I) -> Result<O> {
        let mut ctx = Context::new();
        self.call_with(&mut ctx, input)
    }

    /// Apply the stage, then run every callback with the result.
    pub fn call_with(&self, ctx: &mut Context, input: I) -> Result<O> {
        let result = self.stage.apply(ctx, input)?;
        for callback in &self.callbacks {
            callback(ctx, &result);
        }
        Ok(result)
    }

    /// Sequential composition threading one context through both operators.
    pub fn then<P: 'static>(self, next: Operator<O, P>) -> Operator<I, P> {
        Operator::new(Pipeline::new(self, next))
    }
}

impl<T: 'static> Operator<T, T> {
    /// Operator returning its input unchanged.
    pub fn identity() -> Self {
        Self::new(Identity)
    }
}

impl<I, O> fmt::Debug for Operator<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("input", &self.stage.input_type())
            .field("output", &self.stage.output_type())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl<I: 'static, O: 'static> Stage<I, O> for Operator<I, O> {
    fn apply(&self, ctx: &mut Context, input: I) -> Result<O> {
        self.call_with(ctx, input)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_type(&self) -> &'static str {
        self.stage.input_type()
    }

    fn output_type(&self) -> &'static str {
        self.stage.output_type()
    }
}

/// Two operators applied in sequence on the same context.
pub struct Pipeline<I, M, O> {
    name: String,
    first: Operator<I, M>,
    second: Operator<M, O>,
}

impl<I: 'static, M: 'static, O: 'static> Pipeline<I, M, O> {
    pub fn new(first: Operator<I, M>, second: Operator<M, O>) -> Self {
        Self {
            name: format!("{} | {}", first.name(), second.name()),
            first,
            second,
        }
    }
}

impl<I: 'static, M: 'static, O: 'static> Stage<I, O> for Pipeline<I, M, O> {
    fn apply(&self, ctx: &mut Context, input: I) -> Result<O> {
        let intermediate = self.first.call_with(ctx, input)?;
        self.second.call_with(ctx, intermediate)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_type(&self) -> &'static str {
        self.first.input_type()
    }

    fn output_type(&self) -> &'static str {
        self.second.output_type()
    }
}

/// Returns its input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl<T> Stage<T, T> for Identity {
    fn apply(&self, _ctx: &mut Context, input: T) -> Result<T> {
        Ok(input)
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Stage backed by a plain function.
pub struct FnStage<F> {
    name: String,
    function: F,
}

impl<I, O, F> Stage<I, O> for FnStage<F>
where
    F: Fn(I) -> Result<O> + Send + Sync,
{
    fn apply(&self, _ctx: &mut Context, input: I) -> Result<O> {
        (self.function)(input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
