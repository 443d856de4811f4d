//! Compiles a YAML strategy document into an immutable
//! [`CompiledIr`] the runtime engine can execute without further
//! validation.
//!
//! The pipeline runs in eight stages: parse the document, validate its
//! schema (handled by `serde`'s `deny_unknown_fields`), collect the
//! feature table, type-check every guard expression, lower
//! `invalidate_when` sugar into canonical transitions, validate the FSM's
//! structure, validate order plans, and finally build the dependency-ordered
//! feature plan and emit the IR.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

mod doc;
mod error;
mod ir;
mod pipeline;

pub use doc::{
    ActionSpec, FeatureSpec, MetaSpec, OrderPlanSpec, StateSpec, StrategyDocument,
    TakeProfitLegSpec, TrailingStopSpec, TransitionSpec,
};
pub use error::{CompileError, CompileWarning};
pub use ir::{CompiledIr, DerivedFeature, TrailingStopConfig, TransitionIr};
pub use pipeline::compile;
