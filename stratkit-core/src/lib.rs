#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    missing_debug_implementations,
    rust_2018_idioms
)]

//! Core domain types shared across the Stratkit workspace.
//!
//! This crate has no dependency on any other Stratkit crate; it exists so
//! that the expression layer, feature pipeline, compiler, risk checks and
//! engine can all agree on the shape of a [`Bar`], a [`Side`], a
//! [`Timeframe`] and a [`StrategyState`] without cyclic crate dependencies.

mod bar;
mod side;
mod state;
mod timeframe;

pub use bar::{Bar, BarError};
pub use side::Side;
pub use state::StrategyState;
pub use timeframe::{Timeframe, TimeframeError};
