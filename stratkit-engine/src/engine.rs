use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::log::RuntimeLog;
use crate::outcome::BarOutcome;
use crate::state::RuntimeState;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet, VecDeque};
use stratkit_compiler::{ActionSpec, CompiledIr};
use stratkit_core::{Bar, Side, StrategyState};
use stratkit_execution::{BrokerAdapter, BrokerEnv};
use stratkit_expr::{evaluate, Value};
use stratkit_risk::{OrderPlan, ProposedOrder};
use stratkit_ta::{FeatureError, FeatureRegistry, FeatureValue};

fn to_expr_value(value: FeatureValue) -> Value {
    match value {
        FeatureValue::Number(n) => Value::Number(n),
        FeatureValue::Boolean(b) => Value::Boolean(b),
    }
}

/// Executes a compiled strategy one bar at a time, holding the only
/// mutable runtime state (current FSM vertex, bar history, timers) the
/// strategy has. Replay-deterministic: the same bar sequence fed to two
/// engines constructed the same way produces identical state transitions.
pub struct Engine<A: BrokerAdapter> {
    ir: CompiledIr,
    registry: FeatureRegistry,
    adapter: A,
    env: BrokerEnv,
    config: EngineConfig,
    state: RuntimeState,
    /// When true, action dispatch is skipped entirely: features and
    /// transitions still evaluate, but no broker call is made. Used for
    /// deterministic backtest/replay runs.
    dry_run: bool,
    /// Ring buffer of the most recent [`RuntimeLog`]s across every
    /// processed bar, bounded by `config.log_capacity`
    /// (`spec.md` §7: "a ring-buffer log of configurable size").
    recent_logs: VecDeque<RuntimeLog>,
}

impl<A: BrokerAdapter> Engine<A> {
    pub fn new(ir: CompiledIr, adapter: A, env: BrokerEnv, config: EngineConfig) -> Self {
        let state = RuntimeState::new(config.history_capacity);
        let recent_logs = VecDeque::with_capacity(config.log_capacity.min(1024));
        Self {
            ir,
            registry: FeatureRegistry::with_builtin_library(),
            adapter,
            env,
            config,
            state,
            dry_run: false,
            recent_logs,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn current_state(&self) -> &StrategyState {
        &self.state.current_state
    }

    pub fn snapshot(&self) -> RuntimeState {
        self.state.clone()
    }

    pub fn restore(mut self, state: RuntimeState) -> Self {
        self.state = state;
        self
    }

    /// The most recent runtime logs, oldest first, bounded by
    /// `EngineConfig::log_capacity`.
    pub fn recent_logs(&self) -> impl Iterator<Item = &RuntimeLog> {
        self.recent_logs.iter()
    }

    /// The full per-bar algorithm: reject stale bars, recompute every
    /// feature from scratch, fire at most one transition, dispatch its
    /// action, and return what happened.
    pub async fn process_bar(&mut self, bar: Bar) -> Result<BarOutcome, EngineError> {
        if let Some(previous) = self.state.last_bar_timestamp {
            if bar.timestamp <= previous {
                return Err(EngineError::OutOfOrderBar {
                    previous,
                    received: bar.timestamp,
                });
            }
        }

        let history = self.state.history().to_vec();
        let mut features: HashMap<SmolStr, FeatureValue> = HashMap::new();
        let feature_errors =
            self.registry
                .evaluate(&self.ir.feature_plan, &bar, &history, &mut features);

        let mut pre_logs: Vec<RuntimeLog> = Vec::new();
        let mut errored: HashSet<SmolStr> = HashSet::new();
        for error in feature_errors {
            let feature = match &error {
                FeatureError::MissingDependency { feature, .. } => feature.clone(),
            };
            errored.insert(feature.clone());
            pre_logs.push(RuntimeLog::FeatureError { feature, error });
        }
        for feature in self.state.record_feature_errors(&self.ir.feature_plan, &errored) {
            pre_logs.push(RuntimeLog::DegradedFeature { feature });
        }

        let mut values: HashMap<SmolStr, Value> = features
            .iter()
            .map(|(name, value)| (name.clone(), to_expr_value(*value)))
            .collect();

        for derived in &self.ir.derived_features {
            let value = evaluate(&derived.expr, &values).unwrap_or(Value::Number(f64::NAN));
            values.insert(derived.name.clone(), value);
        }

        for timer in self.state.drain_expired_timers(bar.timestamp) {
            let synthetic = SmolStr::new(format!("timer.{timer}.expired"));
            values.insert(synthetic, Value::Boolean(true));
        }

        let transitions = self.ir.transitions_from(&self.state.current_state).to_vec();
        let mut fired_outcome = None;
        for transition in &transitions {
            let matched = evaluate(&transition.guard, &values).unwrap_or(Value::Boolean(false));
            if matches!(matched, Value::Boolean(true)) {
                fired_outcome = Some(
                    self.dispatch(transition.to.clone(), transition.name.clone(), &transition.action)
                        .await,
                );
                break;
            }
        }

        let mut outcome = match fired_outcome {
            Some(outcome) => outcome,
            None => {
                if self.state.current_state.as_str() == StrategyState::MANAGING {
                    self.advance_managing_trailing_stop(&bar);
                } else {
                    tracing::trace!(state = %self.state.current_state, "no transition fired");
                }
                BarOutcome::idle(self.state.current_state.clone())
            }
        };
        outcome.logs.splice(0..0, pre_logs);
        outcome.feature_values = values;

        for log in &outcome.logs {
            if self.recent_logs.len() == self.config.log_capacity {
                self.recent_logs.pop_front();
            }
            self.recent_logs.push_back(log.clone());
        }

        self.state.push_bar(bar);
        self.state.last_bar_timestamp = Some(bar.timestamp);
        Ok(outcome)
    }

    /// Advances the MANAGING default loopback's trailing stop (`spec.md`
    /// §4.4 step 7), if the state declared one and a position is open.
    /// Broker-silent: the adjusted stop lives only in `RuntimeState`, the
    /// same way an explicit `AdjustStop` action is handled.
    fn advance_managing_trailing_stop(&mut self, bar: &Bar) {
        let Some(config) = self.ir.trailing_stop_for(&self.state.current_state) else {
            tracing::trace!(state = %self.state.current_state, "no transition fired, holding MANAGING position");
            return;
        };
        let Some(plan_name) = self.state.open_order_plan.clone() else {
            return;
        };
        let Some(plan) = self.ir.order_plans.get(&plan_name) else {
            return;
        };
        let is_long = plan.side == Side::Buy;
        let favorable_price = if is_long { bar.high } else { bar.low };
        if self
            .state
            .advance_trailing_stop(favorable_price, config.trail_distance, is_long)
        {
            tracing::debug!(stop = self.state.trailing_stop, symbol = %self.env.symbol, "trailing stop advanced");
        }
    }

    /// Checks a proposed entry against the caps carried on `BrokerEnv`
    /// (`spec.md` §6's `{allowLiveOrders, maxOrderQty, maxNotionalPerSymbol,
    /// dailyLossLimit}`), returning the violation reason on failure.
    fn check_risk_limits(&self, plan: &OrderPlan, quantity: f64) -> Result<(), String> {
        if !self.env.paper_trading && !self.env.allow_live_orders {
            return Err("live orders are disabled for this broker environment".to_string());
        }
        let order = ProposedOrder::new(
            Decimal::from_f64_retain(quantity).unwrap_or(Decimal::MAX),
            Decimal::from_f64_retain(plan.entry_price).unwrap_or(Decimal::MAX),
        );
        self.env
            .risk_limits()
            .evaluate(order, self.state.realised_loss_today)
            .map_err(|e| e.to_string())
    }

    /// Dispatches a firing transition's action. The state transition
    /// commits unconditionally before any broker call: `spec.md` §4.4/§5 —
    /// "the state transition has already committed before any broker
    /// call" and "broker action failures do not roll back the state
    /// transition." A failed broker call or risk check is recorded on the
    /// returned outcome's `logs`, never propagated as an `Err`.
    async fn dispatch(&mut self, to: StrategyState, transition_name: SmolStr, action: &ActionSpec) -> BarOutcome {
        let mut outcome = BarOutcome {
            state: to.clone(),
            fired_transition: Some(transition_name),
            order_handle: None,
            feature_values: HashMap::new(),
            logs: Vec::new(),
        };

        self.state.current_state = to.clone();
        if to.as_str() != StrategyState::MANAGING {
            self.state.reset_trailing_stop();
        }

        if !self.dry_run {
            match action {
                ActionSpec::Noop => {}
                ActionSpec::SubmitOrderPlan { order_plan, quantity } => {
                    let plan = self
                        .ir
                        .order_plans
                        .get(order_plan)
                        .expect("order plan presence was validated at compile time");
                    match self.check_risk_limits(plan, *quantity) {
                        Ok(()) => match self.adapter.submit_order_plan(plan, *quantity).await {
                            Ok(handle) => {
                                self.state.open_order_plan = Some(order_plan.clone());
                                outcome.order_handle = Some(handle);
                            }
                            Err(error) => outcome.logs.push(RuntimeLog::BrokerError {
                                action: "submit_order_plan",
                                error,
                            }),
                        },
                        Err(reason) => outcome.logs.push(RuntimeLog::RiskLimitExceeded {
                            plan: order_plan.clone(),
                            reason,
                        }),
                    }
                }
                ActionSpec::CancelOpenEntries => match self.adapter.cancel_open_entries().await {
                    Ok(()) => {
                        self.state.open_order_plan = None;
                        self.state.reset_trailing_stop();
                    }
                    Err(error) => outcome.logs.push(RuntimeLog::BrokerError {
                        action: "cancel_open_entries",
                        error,
                    }),
                },
                ActionSpec::ExitPosition { quantity_ratio } => {
                    if let Some(plan_name) = self.state.open_order_plan.clone() {
                        if let Some(plan) = self.ir.order_plans.get(&plan_name) {
                            match self
                                .adapter
                                .submit_market_order(plan.side.opposite(), *quantity_ratio)
                                .await
                            {
                                Ok(handle) => {
                                    outcome.order_handle = Some(handle);
                                    self.state.open_order_plan = None;
                                    self.state.reset_trailing_stop();
                                }
                                Err(error) => outcome.logs.push(RuntimeLog::BrokerError {
                                    action: "submit_market_order",
                                    error,
                                }),
                            }
                        }
                    }
                }
                ActionSpec::AdjustStop { new_stop } => {
                    self.state.trailing_stop = Some(*new_stop);
                    tracing::debug!(new_stop, symbol = %self.env.symbol, "stop adjusted");
                }
                ActionSpec::SetTimer { timer, duration_bars } => {
                    let reference = self.state.last_bar_timestamp.unwrap_or(0);
                    self.state
                        .timers
                        .insert(timer.clone(), reference + *duration_bars as i64);
                }
            }
        }

        tracing::debug!(symbol = %self.env.symbol, transition = %outcome.fired_transition.as_deref().unwrap_or(""), to = %to, "transition fired");
        outcome
    }
}
