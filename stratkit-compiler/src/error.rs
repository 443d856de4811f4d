use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("invalid strategy document: {0}")]
    Schema(String),
    #[error("unknown timeframe '{0}'")]
    UnknownTimeframe(String),
    #[error("'{context}' references unknown feature '{feature}'")]
    UnknownFeature { context: SmolStr, feature: SmolStr },
    #[error("'{context}' has a type error: {reason}")]
    TypeMismatch { context: SmolStr, reason: String },
    #[error("'{context}' failed to parse: {reason}")]
    GuardSyntax { context: SmolStr, reason: String },
    #[error("feature dependency cycle detected involving '{0}'")]
    CycleDetected(SmolStr),
    #[error("order plan '{plan}' is invalid: {reason}")]
    InvalidOrderPlan { plan: SmolStr, reason: String },
    #[error("order plan '{plan}' has unknown side '{side}', expected 'buy' or 'sell'")]
    UnknownSide { plan: SmolStr, side: SmolStr },
    #[error("transition '{transition}' references unknown state '{state}'")]
    UnknownState { transition: SmolStr, state: SmolStr },
    #[error("transition '{transition}' references unknown order plan '{plan}'")]
    UnknownOrderPlan { transition: SmolStr, plan: SmolStr },
    #[error("duplicate transition name '{0}'")]
    DuplicateTransition(SmolStr),
    #[error("state '{state}' has an invalid trailing stop: {reason}")]
    InvalidTrailingStop { state: SmolStr, reason: String },
}

/// Non-fatal compile diagnostics, surfaced alongside a successful
/// [`crate::CompiledIr`] rather than aborting compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileWarning {
    UnreachableTerminal(SmolStr),
    UnreachableState(SmolStr),
}
