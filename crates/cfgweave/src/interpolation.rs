//! Variable interpolation in configuration text
//!
//! `${NAME}` is replaced by the value of `NAME`; `${NAME:default}` falls back
//! to `default` when `NAME` is unset. Substitution happens on the raw file
//! text, before parsing.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use cfgweave_core::{Context, Error, Operator, Priority, Result, Stage};
use regex::{Captures, Regex};

use crate::constants::INTERPOLATION_PATTERN;
use crate::factory::Factory;
use crate::spec::{InterpolationSpec, MissingPolicy};

static PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(INTERPOLATION_PATTERN).expect("Invalid interpolation pattern"));

pub type InterpolatorFactory = Factory<InterpolationSpec, String, String>;

/// Where variable values come from.
#[derive(Debug, Clone)]
pub enum Substitutions {
    /// The process environment, read at apply time.
    Environment,
    Fixed(BTreeMap<String, String>),
}

impl Substitutions {
    fn lookup(&self, name: &str) -> Option<String> {
        match self {
            Self::Environment => std::env::var(name).ok(),
            Self::Fixed(values) => values.get(name).cloned(),
        }
    }
}

/// Pattern-substitution stage.
#[derive(Debug, Clone)]
pub struct Interpolator {
    pattern: Regex,
    substitutions: Substitutions,
    on_missing: MissingPolicy,
}

impl Interpolator {
    pub fn new(substitutions: Substitutions, on_missing: MissingPolicy) -> Self {
        Self {
            pattern: PATTERN.clone(),
            substitutions,
            on_missing,
        }
    }

    pub fn environment(on_missing: MissingPolicy) -> Self {
        Self::new(Substitutions::Environment, on_missing)
    }

    pub fn fixed(values: BTreeMap<String, String>, on_missing: MissingPolicy) -> Self {
        Self::new(Substitutions::Fixed(values), on_missing)
    }

    /// Replace the reference pattern. It must define a `variable` group and
    /// may define a `default_value` group.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn interpolate(&self, text: &str) -> Result<String> {
        let mut missing = BTreeSet::new();
        let replaced = self.pattern.replace_all(text, |caps: &Captures<'_>| {
            let name = caps.name("variable").map_or("", |m| m.as_str());
            if let Some(value) = self.substitutions.lookup(name) {
                return value;
            }
            if let Some(default) = caps.name("default_value") {
                return default.as_str().to_string();
            }
            missing.insert(name.to_string());
            match self.on_missing {
                MissingPolicy::Blank => String::new(),
                _ => caps[0].to_string(),
            }
        });

        if !missing.is_empty() {
            let names: Vec<String> = missing.into_iter().collect();
            match self.on_missing {
                MissingPolicy::Raise => return Err(Error::MissingEnvironmentVariable { names }),
                MissingPolicy::Warn => {
                    tracing::warn!(names = %names.join(", "), "Missing environment variables")
                }
                MissingPolicy::Ignore | MissingPolicy::Blank => {
                    tracing::debug!(names = %names.join(", "), "Unresolved variables left to policy")
                }
            }
        }
        Ok(replaced.into_owned())
    }
}

impl Stage<String, String> for Interpolator {
    fn apply(&self, _ctx: &mut Context, text: String) -> Result<String> {
        self.interpolate(&text)
    }

    fn name(&self) -> &str {
        match self.substitutions {
            Substitutions::Environment => "env_interpolator",
            Substitutions::Fixed(_) => "variable_interpolator",
        }
    }
}

impl InterpolatorFactory {
    /// Factory with the built-in interpolation strategies.
    pub fn with_builtins() -> Self {
        let mut factory = Self::new("interpolation", ());
        factory
            .register_variant(
                "absent",
                |spec: &InterpolationSpec| matches!(spec, InterpolationSpec::Absent).then_some(()),
                |(), _: &Self| Ok(Operator::identity()),
                Priority::Rank(0),
            )
            .register_variant(
                "operator",
                |spec: &InterpolationSpec| match spec {
                    InterpolationSpec::Operator(op) => Some(op.clone()),
                    _ => None,
                },
                |op, _: &Self| Ok(op),
                Priority::Rank(10),
            )
            .register_variant(
                "function",
                |spec: &InterpolationSpec| match spec {
                    InterpolationSpec::Function(f) => Some(f.clone()),
                    _ => None,
                },
                |f, _: &Self| Ok(Operator::from_fn("interpolate_fn", move |text: String| f(text))),
                Priority::Rank(20),
            )
            .register_variant(
                "chain",
                |spec: &InterpolationSpec| match spec {
                    InterpolationSpec::Chain(specs) => Some(specs.clone()),
                    _ => None,
                },
                |specs, factory: &Self| {
                    let mut operators = specs.iter().map(|spec| factory.build(spec));
                    let Some(first) = operators.next() else {
                        return Ok(Operator::identity());
                    };
                    operators.try_fold(first?, |chain, next| Ok(chain.then(next?)))
                },
                Priority::Rank(30),
            )
            .register_variant(
                "variables",
                |spec: &InterpolationSpec| match spec {
                    InterpolationSpec::Variables { values, on_missing } => {
                        Some((values.clone(), *on_missing))
                    }
                    _ => None,
                },
                |(values, on_missing), _: &Self| {
                    Ok(Operator::new(Interpolator::fixed(values, on_missing)))
                },
                Priority::Rank(40),
            )
            .register_variant(
                "environment",
                |spec: &InterpolationSpec| match spec {
                    InterpolationSpec::Environment(on_missing) => Some(*on_missing),
                    _ => None,
                },
                |on_missing, _: &Self| Ok(Operator::new(Interpolator::environment(on_missing))),
                Priority::Rank(50),
            );
        factory
    }
}
