//! The on-disk strategy document schema. Deserialized with
//! `#[serde(deny_unknown_fields)]` throughout so a typo in a strategy file
//! is a schema error, not a silently-ignored field.

use indexmap::IndexMap;
use serde::Deserialize;
use smol_str::SmolStr;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyDocument {
    pub meta: MetaSpec,
    pub symbol: SmolStr,
    pub timeframe: SmolStr,
    #[serde(default)]
    pub features: IndexMap<SmolStr, FeatureSpec>,
    #[serde(default)]
    pub order_plans: IndexMap<SmolStr, OrderPlanSpec>,
    pub states: IndexMap<SmolStr, StateSpec>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetaSpec {
    pub name: SmolStr,
    #[serde(default)]
    pub description: Option<String>,
}

/// A named feature slot: either a direct alias for a library indicator, or
/// a derived value computed from an expression over other features.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureSpec {
    #[serde(default)]
    pub library: Option<SmolStr>,
    #[serde(default)]
    pub expr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TakeProfitLegSpec {
    pub price: f64,
    pub size_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderPlanSpec {
    pub side: SmolStr,
    pub entry_price: f64,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profits: Vec<TakeProfitLegSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSpec {
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub invalidate_when: Option<String>,
    #[serde(default)]
    pub invalidate_when_any: Vec<String>,
    #[serde(default)]
    pub invalidate_to: Option<SmolStr>,
    /// The default loopback action a bar with no firing transition takes
    /// while in this state (`spec.md` §4.4 step 7 — "MANAGING may update
    /// trailing stops").
    #[serde(default)]
    pub trailing_stop: Option<TrailingStopSpec>,
}

/// A fixed-distance trailing stop attached to a state: the stop ratchets
/// toward the favorable side as the position's extreme price improves, and
/// never loosens.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrailingStopSpec {
    pub trail_distance: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionSpec {
    pub name: SmolStr,
    pub from: SmolStr,
    pub to: SmolStr,
    pub guard: String,
    #[serde(default)]
    pub action: ActionSpec,
}

/// A side effect a fired transition asks the engine to carry out.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, tag = "type", rename_all = "snake_case")]
pub enum ActionSpec {
    #[default]
    Noop,
    SubmitOrderPlan {
        order_plan: SmolStr,
        quantity: f64,
    },
    CancelOpenEntries,
    ExitPosition {
        quantity_ratio: f64,
    },
    AdjustStop {
        new_stop: f64,
    },
    SetTimer {
        timer: SmolStr,
        duration_bars: u32,
    },
}
