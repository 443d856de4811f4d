use serde::{Deserialize, Serialize};
use stratkit_core::Side;
use thiserror::Error;

/// One partial take-profit leg: exit `size_ratio` of the position at
/// `price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitLeg {
    pub price: f64,
    pub size_ratio: f64,
}

/// A compiled order plan: an entry, an optional protective stop, and zero
/// or more scaled take-profit legs.
///
/// Validated once at compile time (`spec.md` §3) so the runtime never has
/// to re-derive whether a plan makes economic sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub side: Side,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profits: Vec<TakeProfitLeg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrderPlanError {
    #[error("take-profit leg size ratio {0} is not positive")]
    NonPositiveRatio(f64),
    #[error("take-profit size ratios sum to {0}, which exceeds 1.0")]
    BracketRatioExceedsOne(f64),
    #[error("stop-loss {stop_loss} is on the wrong side of entry {entry} for a {side} order")]
    StopLossWrongSide {
        side: Side,
        stop_loss: f64,
        entry: f64,
    },
    #[error("take-profit {price} is on the wrong side of entry {entry} for a {side} order")]
    TakeProfitWrongSide { side: Side, price: f64, entry: f64 },
}

impl OrderPlan {
    /// Validates the bracket-ratio and price-ordering invariants.
    ///
    /// For a `Buy`: `stop_loss < entry_price < take_profit.price` for every
    /// leg. For a `Sell` the inequalities flip. The sum of all
    /// `size_ratio`s must not exceed `1.0`.
    pub fn validate(&self) -> Result<(), OrderPlanError> {
        let mut ratio_sum = 0.0;
        for leg in &self.take_profits {
            if leg.size_ratio <= 0.0 {
                return Err(OrderPlanError::NonPositiveRatio(leg.size_ratio));
            }
            ratio_sum += leg.size_ratio;

            let wrong_side = match self.side {
                Side::Buy => leg.price <= self.entry_price,
                Side::Sell => leg.price >= self.entry_price,
            };
            if wrong_side {
                return Err(OrderPlanError::TakeProfitWrongSide {
                    side: self.side,
                    price: leg.price,
                    entry: self.entry_price,
                });
            }
        }
        if ratio_sum > 1.0 {
            return Err(OrderPlanError::BracketRatioExceedsOne(ratio_sum));
        }

        if let Some(stop_loss) = self.stop_loss {
            let wrong_side = match self.side {
                Side::Buy => stop_loss >= self.entry_price,
                Side::Sell => stop_loss <= self.entry_price,
            };
            if wrong_side {
                return Err(OrderPlanError::StopLossWrongSide {
                    side: self.side,
                    stop_loss,
                    entry: self.entry_price,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_buy_plan() {
        let plan = OrderPlan {
            side: Side::Buy,
            entry_price: 100.0,
            stop_loss: Some(95.0),
            take_profits: vec![
                TakeProfitLeg { price: 105.0, size_ratio: 0.5 },
                TakeProfitLeg { price: 110.0, size_ratio: 0.5 },
            ],
        };
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn rejects_bracket_ratios_summing_above_one() {
        let plan = OrderPlan {
            side: Side::Buy,
            entry_price: 100.0,
            stop_loss: Some(95.0),
            take_profits: vec![
                TakeProfitLeg { price: 105.0, size_ratio: 0.7 },
                TakeProfitLeg { price: 110.0, size_ratio: 0.6 },
            ],
        };
        assert!(matches!(
            plan.validate(),
            Err(OrderPlanError::BracketRatioExceedsOne(_))
        ));
    }

    #[test]
    fn rejects_a_stop_loss_above_entry_on_a_buy() {
        let plan = OrderPlan {
            side: Side::Buy,
            entry_price: 100.0,
            stop_loss: Some(101.0),
            take_profits: vec![],
        };
        assert!(matches!(
            plan.validate(),
            Err(OrderPlanError::StopLossWrongSide { .. })
        ));
    }

    #[test]
    fn rejects_a_take_profit_below_entry_on_a_sell() {
        let plan = OrderPlan {
            side: Side::Sell,
            entry_price: 100.0,
            stop_loss: Some(105.0),
            take_profits: vec![TakeProfitLeg { price: 101.0, size_ratio: 1.0 }],
        };
        assert!(matches!(
            plan.validate(),
            Err(OrderPlanError::TakeProfitWrongSide { .. })
        ));
    }
}
