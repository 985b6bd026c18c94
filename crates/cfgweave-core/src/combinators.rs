//! Lazy stream combinators
//!
//! Streams are single-pass iterators of fallible items. Nothing upstream of a
//! stream runs until the stream is pulled, so errors surface at consumption
//! time, at the position of the failing element.

use crate::context::Context;
use crate::error::Result;
use crate::operator::{Operator, Stage};

/// Lazy, finite, single-pass sequence of fallible values.
pub type Stream<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// Stream over already-computed values.
pub fn from_vec<T: Send + 'static>(items: Vec<T>) -> Stream<T> {
    Box::new(items.into_iter().map(Ok))
}

/// Stream with a single failure.
pub fn failed<T: Send + 'static>(error: crate::Error) -> Stream<T> {
    Box::new(std::iter::once(Err(error)))
}

/// Chain two streams, yielding all of `first` and then all of `second`.
pub fn concat<T: 'static>(first: Stream<T>, second: Stream<T>) -> Stream<T> {
    Box::new(first.chain(second))
}

/// Apply one operator to every element of a list.
///
/// Each element runs on its own fork of the context as it was when the
/// broadcast was applied.
pub struct Broadcast<I, O> {
    operator: Operator<I, O>,
}

impl<I: Send + 'static, O: 'static> Broadcast<I, O> {
    pub fn new(operator: Operator<I, O>) -> Self {
        Self { operator }
    }

    pub fn into_operator(self) -> Operator<Vec<I>, Stream<O>> {
        let name = format!("broadcast({})", self.operator.name());
        Operator::named(name, self)
    }
}

impl<I: Send + 'static, O: 'static> Stage<Vec<I>, Stream<O>> for Broadcast<I, O> {
    fn apply(&self, ctx: &mut Context, inputs: Vec<I>) -> Result<Stream<O>> {
        let operator = self.operator.clone();
        let snapshot = ctx.clone();
        Ok(Box::new(inputs.into_iter().map(move |input| {
            let mut child = snapshot.fork();
            operator.call_with(&mut child, input)
        })))
    }
}

/// Apply several operators to one input, yielding their results in order.
pub struct FanOut<I, O> {
    operators: Vec<Operator<I, O>>,
}

impl<I: Clone + Send + 'static, O: 'static> FanOut<I, O> {
    pub fn new(operators: Vec<Operator<I, O>>) -> Self {
        Self { operators }
    }

    pub fn into_operator(self) -> Operator<I, Stream<O>> {
        let names: Vec<&str> = self.operators.iter().map(|op| op.name()).collect();
        let name = format!("fan_out({})", names.join(", "));
        Operator::named(name, self)
    }
}

impl<I: Clone + Send + 'static, O: 'static> Stage<I, Stream<O>> for FanOut<I, O> {
    fn apply(&self, ctx: &mut Context, input: I) -> Result<Stream<O>> {
        let operators = self.operators.clone();
        let snapshot = ctx.clone();
        Ok(Box::new(operators.into_iter().map(move |operator| {
            let mut child = snapshot.fork();
            operator.call_with(&mut child, input.clone())
        })))
    }
}

/// Concatenate a stream of streams.
///
/// A failed inner stream is yielded in place as a single error item.
pub struct Flatten;

impl Flatten {
    pub fn operator<T: Send + 'static>() -> Operator<Stream<Stream<T>>, Stream<T>> {
        Operator::named("flatten", Flatten)
    }
}

impl<T: Send + 'static> Stage<Stream<Stream<T>>, Stream<T>> for Flatten {
    fn apply(&self, _ctx: &mut Context, outer: Stream<Stream<T>>) -> Result<Stream<T>> {
        Ok(Box::new(outer.flat_map(|inner| match inner {
            Ok(stream) => stream,
            Err(error) => failed(error),
        })))
    }
}

/// Drain a stream into a list, stopping at the first error.
pub struct Collect;

impl Collect {
    pub fn operator<T: 'static>() -> Operator<Stream<T>, Vec<T>> {
        Operator::named("collect", Collect)
    }
}

impl<T: 'static> Stage<Stream<T>, Vec<T>> for Collect {
    fn apply(&self, _ctx: &mut Context, stream: Stream<T>) -> Result<Vec<T>> {
        stream.collect()
    }
}
