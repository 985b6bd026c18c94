//! Validation of the aggregated configuration

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use cfgweave_core::{Context, Error, Operator, Priority, Result, Stage, short_type_name};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::factory::Factory;
use crate::spec::ValidationSpec;

pub type ValidatorFactory = Factory<ValidationSpec, Value, Value>;

type Coerce = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// A target type the configuration must fit.
///
/// Mappings fill struct fields by name; sequences fill tuples and tuple
/// structs by position.
#[derive(Clone)]
pub struct Shape {
    name: &'static str,
    coerce: Coerce,
}

impl Shape {
    /// Shape of `T`. Validation passes the value through `T` and back, so
    /// serde defaults and renames apply to the result.
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Serialize + 'static,
    {
        let name = short_type_name(type_name::<T>());
        Self {
            name,
            coerce: Arc::new(move |value: Value| -> Result<Value> {
                let typed: T = coerce(value, name)?;
                serde_json::to_value(typed).map_err(|e| Error::invalid_config(name, e))
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn check(&self, value: Value) -> Result<Value> {
        (self.coerce)(value)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shape").field(&self.name).finish()
    }
}

/// Deserialize a configuration value into `T`, reporting failures as
/// [`Error::InvalidConfig`] against `target`.
pub fn coerce<T: DeserializeOwned>(value: Value, target: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::invalid_config(target, e))
}

impl Stage<Value, Value> for Shape {
    fn apply(&self, _ctx: &mut Context, value: Value) -> Result<Value> {
        self.check(value)
    }

    fn name(&self) -> &str {
        self.name
    }
}

impl ValidatorFactory {
    /// Factory with the built-in validation strategies.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new("validation", ());
        factory
            .register_variant(
                "absent",
                |spec: &ValidationSpec| matches!(spec, ValidationSpec::Absent).then_some(()),
                |(), _: &Self| Ok(Operator::identity()),
                Priority::Rank(0),
            )
            .register_variant(
                "operator",
                |spec: &ValidationSpec| match spec {
                    ValidationSpec::Operator(op) => Some(op.clone()),
                    _ => None,
                },
                |op, _: &Self| Ok(op),
                Priority::Rank(10),
            )
            .register_variant(
                "function",
                |spec: &ValidationSpec| match spec {
                    ValidationSpec::Function(f) => Some(f.clone()),
                    _ => None,
                },
                |f, _: &Self| Ok(Operator::from_fn("validate_fn", move |value: Value| f(value))),
                Priority::Rank(20),
            )
            .register_variant(
                "shape",
                |spec: &ValidationSpec| match spec {
                    ValidationSpec::Shape(shape) => Some(shape.clone()),
                    _ => None,
                },
                |shape, _: &Self| Ok(Operator::new(shape)),
                Priority::Rank(30),
            );
        factory
    }
}
