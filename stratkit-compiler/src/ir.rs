use crate::doc::ActionSpec;
use crate::error::CompileWarning;
use indexmap::IndexMap;
use smol_str::SmolStr;
use stratkit_core::{StrategyState, Timeframe};
use stratkit_expr::Expr;
use stratkit_risk::OrderPlan;

/// One canonical FSM transition, after all sugar has been lowered.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionIr {
    pub name: SmolStr,
    pub from: StrategyState,
    pub to: StrategyState,
    pub guard: Expr,
    pub action: ActionSpec,
}

/// A derived feature: a named expression evaluated after the library
/// feature plan, in dependency order, so its identifiers may reference
/// library indicators or earlier derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeature {
    pub name: SmolStr,
    pub expr: Expr,
}

/// A trailing-stop configuration attached to a state, advanced by the
/// engine every bar that state has no firing transition (`spec.md` §4.4
/// step 7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingStopConfig {
    pub trail_distance: f64,
}

/// The immutable output of [`crate::compile`]. Everything the runtime
/// engine needs to process bars, with no further validation required.
#[derive(Debug, Clone)]
pub struct CompiledIr {
    pub symbol: SmolStr,
    pub timeframe: Timeframe,
    /// Library features to evaluate every bar, in dependency order.
    pub feature_plan: Vec<SmolStr>,
    /// Derived (expression) features, evaluated after `feature_plan`.
    pub derived_features: Vec<DerivedFeature>,
    pub order_plans: IndexMap<SmolStr, OrderPlan>,
    pub terminal_states: Vec<StrategyState>,
    /// Transitions grouped by origin state, each group sorted by
    /// transition name so the engine's at-most-one-per-bar firing rule is
    /// reproducible.
    pub transitions_by_state: IndexMap<StrategyState, Vec<TransitionIr>>,
    /// Trailing-stop configuration per state, for states that declared one.
    pub trailing_stops: IndexMap<StrategyState, TrailingStopConfig>,
    pub warnings: Vec<CompileWarning>,
}

impl CompiledIr {
    pub fn transitions_from(&self, state: &StrategyState) -> &[TransitionIr] {
        self.transitions_by_state
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn trailing_stop_for(&self, state: &StrategyState) -> Option<TrailingStopConfig> {
        self.trailing_stops.get(state).copied()
    }
}
