use rust_decimal_macros::dec;
use stratkit_core::Side;
use stratkit_risk::{BrokerRiskLimits, OrderPlan, OrderPlanError, ProposedOrder, TakeProfitLeg};

#[test]
fn a_sell_plan_with_descending_take_profits_validates() {
    let plan = OrderPlan {
        side: Side::Sell,
        entry_price: 100.0,
        stop_loss: Some(103.0),
        take_profits: vec![
            TakeProfitLeg { price: 95.0, size_ratio: 0.6 },
            TakeProfitLeg { price: 90.0, size_ratio: 0.4 },
        ],
    };
    assert_eq!(plan.validate(), Ok(()));
}

#[test]
fn a_zero_ratio_leg_is_rejected() {
    let plan = OrderPlan {
        side: Side::Buy,
        entry_price: 100.0,
        stop_loss: None,
        take_profits: vec![TakeProfitLeg { price: 110.0, size_ratio: 0.0 }],
    };
    assert_eq!(
        plan.validate(),
        Err(OrderPlanError::NonPositiveRatio(0.0))
    );
}

#[test]
fn broker_limits_compose_with_plan_validation() {
    let plan = OrderPlan {
        side: Side::Buy,
        entry_price: 100.0,
        stop_loss: Some(95.0),
        take_profits: vec![TakeProfitLeg { price: 110.0, size_ratio: 1.0 }],
    };
    plan.validate().unwrap();

    let limits = BrokerRiskLimits::new(dec!(50), dec!(20_000), dec!(1_000));
    let order = ProposedOrder::new(dec!(10), dec!(100));
    assert!(limits.evaluate(order, dec!(0)).is_ok());
}
