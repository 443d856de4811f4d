//! The eight-stage compile pipeline: parse, validate schema, collect the
//! feature table, type-check expressions, lower sugar, validate FSM
//! structure, validate order plans, and finally emit the immutable IR.

use crate::doc::{ActionSpec, OrderPlanSpec, StateSpec, StrategyDocument, TransitionSpec};
use crate::error::{CompileError, CompileWarning};
use crate::ir::{CompiledIr, DerivedFeature, TrailingStopConfig, TransitionIr};
use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use stratkit_core::{Side, StrategyState, Timeframe};
use stratkit_expr::{self as expr, Type};
use stratkit_risk::{OrderPlan, TakeProfitLeg};
use stratkit_ta::FeatureRegistry;

/// Boolean-valued library features. Every other library feature is
/// numeric; this list is small enough to hand-maintain alongside the
/// indicator registry rather than threading a value-type tag through it.
const BOOLEAN_LIBRARY_FEATURES: [&str; 2] = ["sma_rising_20", "cup_and_handle"];

pub fn compile(text: &str) -> Result<CompiledIr, CompileError> {
    let doc: StrategyDocument =
        serde_yaml::from_str(text).map_err(|e| CompileError::Schema(e.to_string()))?;

    let timeframe = Timeframe::from_str(doc.timeframe.as_str())
        .map_err(|_| CompileError::UnknownTimeframe(doc.timeframe.to_string()))?;

    let registry = FeatureRegistry::with_builtin_library();
    let mut feature_types: HashMap<SmolStr, Type> = HashMap::new();
    for descriptor in registry.enumerate() {
        let ty = if BOOLEAN_LIBRARY_FEATURES.contains(&descriptor.name.as_str()) {
            Type::Boolean
        } else {
            Type::Number
        };
        feature_types.insert(descriptor.name.clone(), ty);
    }

    // Stage: collect the feature table. Library aliases are type-checked
    // against the registry; derived (expr) features are parsed, type
    // checked against whatever is already known, and folded into the type
    // table in declaration order so later features and guards may depend
    // on them.
    let mut derived_order: Vec<SmolStr> = Vec::new();
    let mut derived_exprs: HashMap<SmolStr, expr::Expr> = HashMap::new();
    for (name, spec) in &doc.features {
        match (&spec.library, &spec.expr) {
            (Some(library_name), None) => {
                let ty = feature_types.get(library_name.as_str()).copied().ok_or_else(|| {
                    CompileError::UnknownFeature {
                        context: name.clone(),
                        feature: library_name.clone(),
                    }
                })?;
                feature_types.insert(name.clone(), ty);
            }
            (None, Some(source)) => {
                let parsed = expr::parse(source).map_err(|e| CompileError::GuardSyntax {
                    context: name.clone(),
                    reason: e.to_string(),
                })?;
                let ty = expr::type_check(&parsed, &feature_types).map_err(|e| {
                    CompileError::TypeMismatch {
                        context: name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                feature_types.insert(name.clone(), ty);
                derived_exprs.insert(name.clone(), parsed);
                derived_order.push(name.clone());
            }
            _ => {
                return Err(CompileError::Schema(format!(
                    "feature '{name}' must set exactly one of 'library' or 'expr'"
                )))
            }
        }
    }

    // Stage: lower invalidate_when / invalidate_when_any sugar into
    // canonical transitions before doing anything that looks at the
    // transition list as a whole.
    let mut transitions = doc.transitions.clone();
    for (state_name, spec) in &doc.states {
        transitions.extend(lower_invalidation_sugar(state_name, spec));
    }

    // Stage: type-check every transition guard and collect the set of
    // feature identifiers actually referenced anywhere.
    let mut seen_names: HashSet<SmolStr> = HashSet::new();
    let mut referenced: IndexSet<SmolStr> = IndexSet::new();
    let mut parsed_guards: HashMap<SmolStr, expr::Expr> = HashMap::new();
    for transition in &transitions {
        if !seen_names.insert(transition.name.clone()) {
            return Err(CompileError::DuplicateTransition(transition.name.clone()));
        }
        let guard = expr::parse(&transition.guard).map_err(|e| CompileError::GuardSyntax {
            context: transition.name.clone(),
            reason: e.to_string(),
        })?;
        for ident in expr::free_identifiers(&guard) {
            if !feature_types.contains_key(&ident) {
                return Err(CompileError::UnknownFeature {
                    context: transition.name.clone(),
                    feature: ident,
                });
            }
            referenced.insert(ident);
        }
        let ty = expr::type_check(&guard, &feature_types).map_err(|e| CompileError::TypeMismatch {
            context: transition.name.clone(),
            reason: e.to_string(),
        })?;
        if ty != Type::Boolean {
            return Err(CompileError::TypeMismatch {
                context: transition.name.clone(),
                reason: format!("guard must evaluate to a boolean, found {ty:?}"),
            });
        }
        parsed_guards.insert(transition.name.clone(), guard);
    }
    for derived in &derived_order {
        for ident in expr::free_identifiers(&derived_exprs[derived]) {
            referenced.insert(ident);
        }
    }

    // Stage: validate FSM structure. Every `from`/`to` must be a declared
    // state (or a canonical default), and no transition may leave EXITED.
    let mut known_states: IndexMap<SmolStr, bool> = IndexMap::new();
    for label in StrategyState::canonical_labels() {
        known_states.insert(SmolStr::new(label), label == StrategyState::EXITED);
    }
    for (name, spec) in &doc.states {
        known_states.insert(name.clone(), spec.terminal);
    }
    for transition in &transitions {
        if !known_states.contains_key(&transition.from) {
            return Err(CompileError::UnknownState {
                transition: transition.name.clone(),
                state: transition.from.clone(),
            });
        }
        if !known_states.contains_key(&transition.to) {
            return Err(CompileError::UnknownState {
                transition: transition.name.clone(),
                state: transition.to.clone(),
            });
        }
        if known_states[&transition.from] {
            return Err(CompileError::Schema(format!(
                "transition '{}' leaves terminal state '{}'",
                transition.name, transition.from
            )));
        }
    }

    // Stage: validate order plans and any order-plan references in
    // actions.
    let mut order_plans: IndexMap<SmolStr, OrderPlan> = IndexMap::new();
    for (name, spec) in &doc.order_plans {
        let plan = build_order_plan(name, spec)?;
        plan.validate()
            .map_err(|e| CompileError::InvalidOrderPlan {
                plan: name.clone(),
                reason: e.to_string(),
            })?;
        order_plans.insert(name.clone(), plan);
    }
    for transition in &transitions {
        if let ActionSpec::SubmitOrderPlan { order_plan, .. } = &transition.action {
            if !order_plans.contains_key(order_plan) {
                return Err(CompileError::UnknownOrderPlan {
                    transition: transition.name.clone(),
                    plan: order_plan.clone(),
                });
            }
        }
    }

    // Stage: collect per-state trailing-stop configuration (spec.md §4.3
    // stage 4's sibling sugar for the default MANAGING loopback).
    let mut trailing_stops: IndexMap<StrategyState, TrailingStopConfig> = IndexMap::new();
    for (state_name, spec) in &doc.states {
        if let Some(trailing_stop) = &spec.trailing_stop {
            if trailing_stop.trail_distance <= 0.0 {
                return Err(CompileError::InvalidTrailingStop {
                    state: state_name.clone(),
                    reason: "trail_distance must be positive".to_string(),
                });
            }
            trailing_stops.insert(
                StrategyState::new(state_name.clone()),
                TrailingStopConfig {
                    trail_distance: trailing_stop.trail_distance,
                },
            );
        }
    }

    // Stage: build the library feature evaluation plan via the registry's
    // dependency-ordered topological sort.
    let library_roots: Vec<SmolStr> = referenced
        .iter()
        .filter(|name| registry.contains(name.as_str()))
        .cloned()
        .collect();
    let feature_plan = registry
        .plan(&library_roots)
        .map_err(|e| CompileError::CycleDetected(SmolStr::new(e.to_string())))?;

    let derived_features = derived_order
        .into_iter()
        .map(|name| {
            let expr = derived_exprs.remove(&name).expect("just inserted above");
            DerivedFeature { name, expr }
        })
        .collect();

    // Stage: emit the IR.
    let mut transitions_by_state: IndexMap<StrategyState, Vec<TransitionIr>> = IndexMap::new();
    for transition in transitions {
        let guard = parsed_guards
            .remove(&transition.name)
            .expect("every transition was guard-checked above");
        let ir = TransitionIr {
            name: transition.name,
            from: StrategyState::new(transition.from.clone()),
            to: StrategyState::new(transition.to.clone()),
            guard,
            action: transition.action,
        };
        transitions_by_state
            .entry(StrategyState::new(transition.from))
            .or_default()
            .push(ir);
    }
    for group in transitions_by_state.values_mut() {
        group.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let mut warnings = Vec::new();
    let mut reachable: HashSet<SmolStr> = HashSet::new();
    reachable.insert(SmolStr::new(StrategyState::IDLE));
    for group in transitions_by_state.values() {
        for transition in group {
            reachable.insert(SmolStr::new(transition.to.as_str()));
        }
    }
    for (name, is_terminal) in &known_states {
        if *is_terminal && !reachable.contains(name) && name.as_str() != StrategyState::EXITED {
            warnings.push(CompileWarning::UnreachableTerminal(name.clone()));
        }
        if !reachable.contains(name) && name.as_str() != StrategyState::IDLE {
            warnings.push(CompileWarning::UnreachableState(name.clone()));
        }
    }

    let terminal_states = known_states
        .iter()
        .filter(|(_, terminal)| **terminal)
        .map(|(name, _)| StrategyState::new(name.clone()))
        .collect();

    Ok(CompiledIr {
        symbol: doc.symbol,
        timeframe,
        feature_plan,
        derived_features,
        order_plans,
        terminal_states,
        transitions_by_state,
        trailing_stops,
        warnings,
    })
}

fn build_order_plan(name: &SmolStr, spec: &OrderPlanSpec) -> Result<OrderPlan, CompileError> {
    let side = match spec.side.to_ascii_lowercase().as_str() {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        _ => {
            return Err(CompileError::UnknownSide {
                plan: name.clone(),
                side: spec.side.clone(),
            })
        }
    };
    Ok(OrderPlan {
        side,
        entry_price: spec.entry_price,
        stop_loss: spec.stop_loss,
        take_profits: spec
            .take_profits
            .iter()
            .map(|leg| TakeProfitLeg {
                price: leg.price,
                size_ratio: leg.size_ratio,
            })
            .collect(),
    })
}

/// The action an invalidation transition carries, derived from the source
/// state: `CancelOpenEntries` while an entry is still working (`ARMED`,
/// `PLACED`), `ExitPosition` once a position is actually open (`MANAGING`).
/// Custom states with no such meaning carry no side effect.
fn invalidation_action(state_name: &str) -> ActionSpec {
    if state_name == StrategyState::ARMED || state_name == StrategyState::PLACED {
        ActionSpec::CancelOpenEntries
    } else if state_name == StrategyState::MANAGING {
        ActionSpec::ExitPosition { quantity_ratio: 1.0 }
    } else {
        ActionSpec::Noop
    }
}

/// Lowers a state's `invalidate_when`/`invalidate_when_any` sugar into
/// canonical transitions, one per clause: a single clause from
/// `invalidate_when` becomes one transition named `"{state}.invalidate"`; a
/// list under `invalidate_when_any` becomes `n` separate transitions
/// (`"{state}.invalidate.0"`, `"{state}.invalidate.1"`, ...), all targeting
/// `invalidate_to` (or `EXITED` by default) and sharing the same priority
/// tier by declaration order.
fn lower_invalidation_sugar(state_name: &SmolStr, spec: &StateSpec) -> Vec<TransitionSpec> {
    let to = spec
        .invalidate_to
        .clone()
        .unwrap_or_else(|| SmolStr::new(StrategyState::EXITED));
    let action = invalidation_action(state_name.as_str());

    let mut transitions = Vec::new();
    if let Some(guard) = &spec.invalidate_when {
        transitions.push(TransitionSpec {
            name: SmolStr::new(format!("{state_name}.invalidate")),
            from: state_name.clone(),
            to: to.clone(),
            guard: guard.clone(),
            action: action.clone(),
        });
    }
    for (i, guard) in spec.invalidate_when_any.iter().enumerate() {
        transitions.push(TransitionSpec {
            name: SmolStr::new(format!("{state_name}.invalidate.{i}")),
            from: state_name.clone(),
            to: to.clone(),
            guard: guard.clone(),
            action: action.clone(),
        });
    }
    transitions
}
