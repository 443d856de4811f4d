use std::collections::HashMap;
use stratkit_expr::{evaluate, free_identifiers, parse, type_check, Type, Value};

#[test]
fn compiles_and_runs_a_guard_expression() {
    let expr = parse("(close - ema20) / ema20 > 0.02 && !is_exhausted").unwrap();

    let mut types = HashMap::new();
    types.insert("close".into(), Type::Number);
    types.insert("ema20".into(), Type::Number);
    types.insert("is_exhausted".into(), Type::Boolean);
    assert_eq!(type_check(&expr, &types).unwrap(), Type::Boolean);

    let idents = free_identifiers(&expr);
    assert_eq!(idents.len(), 3);

    let mut values = HashMap::new();
    values.insert("close".into(), Value::Number(102.0));
    values.insert("ema20".into(), Value::Number(100.0));
    values.insert("is_exhausted".into(), Value::Boolean(false));
    assert_eq!(evaluate(&expr, &values).unwrap(), Value::Boolean(true));
}

#[test]
fn rejects_mixed_type_comparison_at_compile_time() {
    let expr = parse("rsi > is_trending").unwrap();
    let mut types = HashMap::new();
    types.insert("rsi".into(), Type::Number);
    types.insert("is_trending".into(), Type::Boolean);
    assert!(type_check(&expr, &types).is_err());
}
