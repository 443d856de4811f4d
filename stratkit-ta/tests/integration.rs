use std::collections::HashMap;
use stratkit_core::Bar;
use stratkit_ta::{indicators, FeatureRegistry};

fn bar(ts: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar::new(ts, open, high, low, close, volume).unwrap()
}

#[test]
fn ema_over_a_steadily_rising_series_matches_the_closed_form() {
    let series: Vec<Bar> = (0..10)
        .map(|i| {
            let close = 10.0 + i as f64;
            bar(i, close, close, close, close, 1.0)
        })
        .collect();
    let value = indicators::ema(&series, 5);
    assert!((value - 14.0).abs() < 1e-9, "got {value}");
}

#[test]
fn flat_closes_yield_neutral_rsi_zero_atr_and_collapsed_bollinger() {
    let series: Vec<Bar> = (0..30).map(|i| bar(i, 100.0, 100.0, 100.0, 100.0, 1.0)).collect();
    assert!((indicators::rsi(&series, 14) - 50.0).abs() < 1e-9);
    assert_eq!(indicators::atr(&series, 14), 0.0);
    assert_eq!(
        indicators::bollinger(&series, 20, 2.0),
        (100.0, 100.0, 100.0)
    );
}

#[test]
fn obv_accumulates_signed_volume_on_up_moves() {
    let series = vec![
        bar(0, 10.0, 10.0, 10.0, 10.0, 100.0),
        bar(1, 11.0, 11.0, 11.0, 11.0, 1000.0),
        bar(2, 12.0, 12.0, 12.0, 12.0, 1000.0),
        bar(3, 13.0, 13.0, 13.0, 13.0, 1500.0),
    ];
    let value = indicators::obv(&series);
    assert_eq!(value, 3500.0);
}

#[test]
fn registry_plan_evaluates_a_full_feature_set_for_one_bar() {
    let registry = FeatureRegistry::with_builtin_library();
    let roots: Vec<_> = vec![
        "sma_20".into(),
        "ema_50".into(),
        "rsi_14".into(),
        "macd".into(),
        "macd_signal".into(),
        "bollinger_upper_20_2".into(),
        "atr_14".into(),
        "adx_14".into(),
        "stoch_k_14_3".into(),
        "cci_20".into(),
        "williams_r_14".into(),
        "obv".into(),
        "vwap".into(),
        "sma_rising_20".into(),
        "cup_and_handle".into(),
    ];
    let plan = registry.plan(&roots).unwrap();
    assert_eq!(plan.len(), roots.len());

    let mut series: Vec<Bar> = Vec::new();
    for i in 0..60 {
        let close = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1;
        series.push(bar(i, close, close + 1.0, close - 1.0, close, 1000.0 + i as f64));
    }
    let (last, history) = series.split_last().unwrap();

    let mut out = HashMap::new();
    registry.evaluate(&plan, last, history, &mut out);

    for name in &roots {
        assert!(out.contains_key(name.as_str()), "missing {name}");
        let value = out[name.as_str()];
        if let Some(n) = value.as_number() {
            assert!(!n.is_nan() || name == "cci_20", "{name} was NaN");
        }
    }
}

#[test]
fn plan_is_stable_across_repeated_calls() {
    let registry = FeatureRegistry::with_builtin_library();
    let roots = vec!["macd".into(), "rsi_14".into()];
    let first = registry.plan(&roots).unwrap();
    let second = registry.plan(&roots).unwrap();
    assert_eq!(first, second);
}
