use crate::log::RuntimeLog;
use smol_str::SmolStr;
use std::collections::HashMap;
use stratkit_core::StrategyState;
use stratkit_execution::OrderHandle;
use stratkit_expr::Value;

/// What happened while processing one bar, returned by
/// [`crate::Engine::process_bar`].
#[derive(Debug, Clone, PartialEq)]
pub struct BarOutcome {
    pub state: StrategyState,
    pub fired_transition: Option<SmolStr>,
    pub order_handle: Option<OrderHandle>,
    /// Every feature value computed for this bar, library and derived
    /// (`spec.md` §4.4: `BarOutcome.featureValues`).
    pub feature_values: HashMap<SmolStr, Value>,
    pub logs: Vec<RuntimeLog>,
}

impl BarOutcome {
    pub fn idle(state: StrategyState) -> Self {
        Self {
            state,
            fired_transition: None,
            order_handle: None,
            feature_values: HashMap::new(),
            logs: Vec::new(),
        }
    }
}
