//! Feature registry and indicator library: deterministic, per-bar,
//! dependency-ordered computation of every OHLCV indicator and pattern a
//! compiled strategy can reference by name.
//!
//! Every evaluator recomputes its value from the bar series handed to it;
//! none retain state between bars. That keeps replay deterministic: feed
//! the same bars in the same order and every feature value is reproduced
//! exactly, regardless of what ran before.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

mod builtins;
mod context;
mod descriptor;
pub mod indicators;
pub mod patterns;
mod registry;
mod value;

pub use context::FeatureComputeContext;
pub use descriptor::{FeatureDescriptor, FeatureKind};
pub use patterns::CupAndHandle;
pub use registry::{FeatureError, FeatureRegistry, RegistryError};
pub use value::FeatureValue;
