use stratkit_compiler::{compile, ActionSpec, CompileError};
use stratkit_core::StrategyState;

const BREAKOUT_STRATEGY: &str = r#"
meta:
  name: breakout-long
symbol: BTC-USD
timeframe: H1
features:
  trend_up:
    expr: "close > ema_50"
order_plans:
  long_entry:
    side: buy
    entry_price: 100.0
    stop_loss: 95.0
    take_profits:
      - price: 110.0
        size_ratio: 1.0
states:
  IDLE: {}
  ARMED:
    invalidate_when: "rsi_14 > 80"
  PLACED: {}
  MANAGING: {}
  EXITED:
    terminal: true
transitions:
  - name: arm_on_breakout
    from: IDLE
    to: ARMED
    guard: "trend_up && sma_rising_20"
    action:
      type: noop
  - name: enter_on_confirmation
    from: ARMED
    to: PLACED
    guard: "close > high_252"
    action:
      type: submit_order_plan
      order_plan: long_entry
      quantity: 1.0
"#;

#[test]
fn compiles_a_well_formed_strategy_document() {
    let ir = compile(BREAKOUT_STRATEGY).unwrap();
    assert_eq!(ir.symbol.as_str(), "BTC-USD");
    assert!(ir.feature_plan.iter().any(|f| f == "ema_50"));
    assert!(ir.feature_plan.iter().any(|f| f == "rsi_14"));
    assert!(ir.derived_features.iter().any(|f| f.name == "trend_up"));
    assert!(ir.order_plans.contains_key("long_entry"));

    let armed = StrategyState::new("ARMED");
    let from_armed = ir.transitions_from(&armed);
    assert_eq!(from_armed.len(), 2, "{from_armed:?}");
    assert_eq!(from_armed[0].name, "ARMED.invalidate");
    assert_eq!(from_armed[0].action, ActionSpec::CancelOpenEntries);
    assert_eq!(from_armed[1].name, "enter_on_confirmation");
    assert_eq!(
        from_armed[1].action,
        ActionSpec::SubmitOrderPlan {
            order_plan: "long_entry".into(),
            quantity: 1.0,
        }
    );
}

#[test]
fn invalidate_when_any_lowers_to_one_transition_per_clause() {
    let with_list = BREAKOUT_STRATEGY.replace(
        "  MANAGING: {}",
        "  MANAGING:\n    invalidate_when_any:\n      - \"rsi_14 > 80\"\n      - \"close < atr_14\"",
    );
    let ir = compile(&with_list).unwrap();

    let managing = StrategyState::new("MANAGING");
    let from_managing = ir.transitions_from(&managing);
    assert_eq!(from_managing.len(), 2, "{from_managing:?}");
    assert_eq!(from_managing[0].name, "MANAGING.invalidate.0");
    assert_eq!(from_managing[1].name, "MANAGING.invalidate.1");
    for transition in from_managing {
        assert_eq!(transition.to, StrategyState::exited());
        assert_eq!(
            transition.action,
            ActionSpec::ExitPosition { quantity_ratio: 1.0 }
        );
    }
}

#[test]
fn rejects_a_guard_referencing_an_unknown_feature() {
    let broken = BREAKOUT_STRATEGY.replace("close > high_252", "close > phantom_feature");
    let err = compile(&broken).unwrap_err();
    assert!(matches!(err, CompileError::UnknownFeature { .. }));
}

#[test]
fn rejects_an_order_plan_with_an_inverted_stop_loss() {
    let broken = BREAKOUT_STRATEGY.replace("stop_loss: 95.0", "stop_loss: 105.0");
    let err = compile(&broken).unwrap_err();
    assert!(matches!(err, CompileError::InvalidOrderPlan { .. }));
}

#[test]
fn rejects_a_transition_leaving_a_terminal_state() {
    let broken = BREAKOUT_STRATEGY.replace(
        "  - name: arm_on_breakout",
        "  - name: resurrect\n    from: EXITED\n    to: IDLE\n    guard: \"true\"\n  - name: arm_on_breakout",
    );
    let err = compile(&broken).unwrap_err();
    assert!(matches!(err, CompileError::Schema(_)));
}
