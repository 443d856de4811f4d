use crate::check::{CheckFailHigherThan, CheckHigherThan, RiskCheck};
use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configured broker-environment limits a compiled strategy's orders are
/// checked against before submission.
///
/// Money-like quantities here use [`Decimal`] rather than `f64`, the one
/// deliberate exception to the rest of the crate's IEEE-754 `f64`
/// convention: limits are compared for equality against configuration
/// values a user typed in, so binary-float rounding would be surprising.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Constructor)]
pub struct BrokerRiskLimits {
    /// Maximum quantity for a single order.
    pub max_order_quantity: Decimal,
    /// Maximum notional (price * quantity) for a single order.
    pub max_order_notional: Decimal,
    /// Maximum cumulative realised loss allowed in a trading day.
    pub max_daily_loss: Decimal,
}

/// A single proposed order, as presented to [`BrokerRiskLimits::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
pub struct ProposedOrder {
    pub quantity: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RiskLimitError {
    #[error("order quantity check failed: {0}")]
    Quantity(CheckFailHigherThan<Decimal>),
    #[error("order notional check failed: {0}")]
    Notional(CheckFailHigherThan<Decimal>),
    #[error("daily loss check failed: {0}")]
    DailyLoss(CheckFailHigherThan<Decimal>),
}

impl BrokerRiskLimits {
    /// Runs every configured check against a proposed order and the
    /// day's realised loss so far. Returns the first violation found, if
    /// any order-plan error occurs; all configured checks are independent,
    /// so callers wanting every violation can call the individual
    /// `check_*` methods directly.
    pub fn evaluate(
        &self,
        order: ProposedOrder,
        realised_loss_today: Decimal,
    ) -> Result<(), RiskLimitError> {
        self.check_quantity(order.quantity)?;
        self.check_notional(order)?;
        self.check_daily_loss(realised_loss_today)?;
        Ok(())
    }

    pub fn check_quantity(&self, quantity: Decimal) -> Result<(), RiskLimitError> {
        CheckHigherThan::new(self.max_order_quantity)
            .check(&quantity)
            .map_err(RiskLimitError::Quantity)
    }

    pub fn check_notional(&self, order: ProposedOrder) -> Result<(), RiskLimitError> {
        let notional = order.quantity * order.price;
        CheckHigherThan::new(self.max_order_notional)
            .check(&notional)
            .map_err(RiskLimitError::Notional)
    }

    pub fn check_daily_loss(&self, realised_loss_today: Decimal) -> Result<(), RiskLimitError> {
        CheckHigherThan::new(self.max_daily_loss)
            .check(&realised_loss_today)
            .map_err(RiskLimitError::DailyLoss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limits() -> BrokerRiskLimits {
        BrokerRiskLimits::new(dec!(100), dec!(10_000), dec!(500))
    }

    #[test]
    fn accepts_an_order_within_all_limits() {
        let order = ProposedOrder::new(dec!(10), dec!(50));
        assert!(limits().evaluate(order, dec!(0)).is_ok());
    }

    #[test]
    fn rejects_an_order_exceeding_notional() {
        let order = ProposedOrder::new(dec!(500), dec!(50));
        let err = limits().evaluate(order, dec!(0)).unwrap_err();
        assert!(matches!(err, RiskLimitError::Notional(_)));
    }

    #[test]
    fn rejects_once_daily_loss_is_exceeded() {
        let order = ProposedOrder::new(dec!(1), dec!(1));
        let err = limits().evaluate(order, dec!(501)).unwrap_err();
        assert!(matches!(err, RiskLimitError::DailyLoss(_)));
    }
}
