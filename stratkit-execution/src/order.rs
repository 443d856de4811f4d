use serde::{Deserialize, Serialize};
use stratkit_core::Side;

/// Broker-assigned identifier for a submitted order.
///
/// In the mock adapter these are simply sequential; a live adapter would
/// carry whatever identifier the venue returns.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
    Rejected,
}

/// A live handle to an order the engine has submitted, returned by every
/// [`crate::BrokerAdapter`] submission method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderHandle {
    pub id: OrderId,
    pub side: Side,
    pub quantity: f64,
    pub status: OrderStatus,
}
