use stratkit_compiler::compile;
use stratkit_core::{Bar, StrategyState};
use stratkit_execution::{BrokerEnv, MockBrokerAdapter};
use stratkit_engine::{Engine, EngineConfig, EngineError, EngineSnapshot};

const STRATEGY: &str = r#"
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
      - price: 130.0
        size_ratio: 1.0
states:
  IDLE: {}
  ARMED: {}
  PLACED: {}
  MANAGING: {}
  EXITED:
    terminal: true
transitions:
  - name: arm_on_breakout
    from: IDLE
    to: ARMED
    guard: "trend_up"
    action:
      type: noop
  - name: enter_on_confirmation
    from: ARMED
    to: PLACED
    guard: "close > 100"
    action:
      type: submit_order_plan
      order_plan: long_entry
      quantity: 1.0
"#;

fn bar(ts: i64, close: f64) -> Bar {
    Bar::new(ts, close, close + 1.0, close - 1.0, close, 10.0).unwrap()
}

fn engine() -> Engine<MockBrokerAdapter> {
    let ir = compile(STRATEGY).unwrap();
    let adapter = MockBrokerAdapter::new();
    let env = BrokerEnv::new("BTC-USD", true);
    Engine::new(ir, adapter, env, EngineConfig::default())
}

#[tokio::test]
async fn rising_closes_arm_the_strategy_then_enter_on_confirmation() {
    let mut engine = engine();

    for (i, close) in (0..80).map(|i| (i, 50.0 + i as f64)) {
        engine.process_bar(bar(i, close)).await.unwrap();
    }

    // Closes have been strictly rising for 80 bars, well past ema_50's
    // lookback, so `trend_up` holds and the confirmation guard
    // (`close > 100`) is satisfied long before the loop ends.
    assert_ne!(engine.current_state(), &StrategyState::idle());
}

#[tokio::test]
async fn at_most_one_transition_fires_per_bar() {
    let mut engine = engine();
    let outcome = engine.process_bar(bar(0, 200.0)).await.unwrap();
    // Only "arm_on_breakout" can fire from IDLE in a single bar, never both
    // transitions in the same call.
    assert!(outcome.fired_transition.is_none() || outcome.fired_transition.as_deref() == Some("arm_on_breakout"));
}

#[tokio::test]
async fn out_of_order_bars_are_rejected() {
    let mut engine = engine();
    engine.process_bar(bar(10, 100.0)).await.unwrap();
    let err = engine.process_bar(bar(5, 100.0)).await.unwrap_err();
    assert!(matches!(err, EngineError::OutOfOrderBar { previous: 10, received: 5 }));
}

#[tokio::test]
async fn replaying_the_same_bars_from_a_snapshot_is_deterministic() {
    let mut engine = engine();
    for i in 0..10 {
        engine.process_bar(bar(i, 100.0 + i as f64)).await.unwrap();
    }
    let snapshot = EngineSnapshot::capture("BTC-USD", &engine);
    let json = snapshot.to_json().unwrap();

    let restored_snapshot = EngineSnapshot::from_json(&json).unwrap();
    let fresh = engine();
    let restored = restored_snapshot.apply(fresh);

    assert_eq!(restored.current_state(), engine.current_state());
}
