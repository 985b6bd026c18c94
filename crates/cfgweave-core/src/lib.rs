//! Composition core for cfgweave
//!
//! Everything a configuration pipeline is built from:
//!
//! - **Operators**: typed stages with identity, post-invocation callbacks and
//!   sequential composition
//! - **Context**: the per-invocation side channel operators use to pass
//!   values to stages further down the same pipeline
//! - **Combinators**: lazy broadcast, fan-out and flatten over streams
//! - **Registries**: predicate-ordered and extension-keyed strategy tables
//!
//! ```text
//!   paths --broadcast(validate | read | interpolate | parse | section)--+
//!                                                                      |-- concat --> aggregate | validate
//!   argv  --scan | fan_out(file overlays, key overlays) | flatten ------+
//! ```

pub mod combinators;
pub mod context;
pub mod error;
pub mod operator;
pub mod registry;

pub use combinators::{Broadcast, Collect, FanOut, Flatten, Stream, concat, failed, from_vec};
pub use context::{Attributes, Context, OperatorId};
pub use error::{Error, Result};
pub use operator::{Callback, FnStage, Identity, Operator, Pipeline, Stage, short_type_name};
pub use registry::{KeyedRegistry, Predicate, Priority, StrategyRegistry, normalize_extension};
