use crate::order::OrderId;
use thiserror::Error;

/// Errors a [`crate::BrokerAdapter`] can return. Deliberately small: the
/// engine treats every variant the same way (log it, leave state
/// unchanged, retry on the next bar if the transition still applies).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BrokerError {
    #[error("broker rejected the order: {0}")]
    Rejected(String),
    #[error("broker connection unavailable")]
    Disconnected,
    #[error("unknown order {0}")]
    UnknownOrder(OrderId),
}
