use crate::adapter::BrokerAdapter;
use crate::error::BrokerError;
use crate::order::{OrderHandle, OrderId, OrderStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use stratkit_core::Side;
use stratkit_risk::OrderPlan;

/// Deterministic, in-memory [`BrokerAdapter`] used for dry-run replay and
/// tests. Order ids are assigned from a shared atomic counter, so two
/// adapters cloned from the same root hand out distinct, monotonically
/// increasing ids; a fresh adapter always starts its own sequence at 1,
/// keeping replay runs reproducible regardless of process state.
#[derive(Debug, Clone)]
pub struct MockBrokerAdapter {
    next_id: Arc<AtomicU64>,
    open_orders: Arc<Mutex<Vec<OrderHandle>>>,
}

impl Default for MockBrokerAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBrokerAdapter {
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(1)),
            open_orders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn next_order_id(&self) -> OrderId {
        OrderId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl BrokerAdapter for MockBrokerAdapter {
    async fn submit_order_plan(
        &self,
        plan: &OrderPlan,
        quantity: f64,
    ) -> Result<OrderHandle, BrokerError> {
        plan.validate()
            .map_err(|e| BrokerError::Rejected(e.to_string()))?;
        let handle = OrderHandle {
            id: self.next_order_id(),
            side: plan.side,
            quantity,
            status: OrderStatus::Open,
        };
        self.open_orders.lock().unwrap().push(handle);
        tracing::debug!(order = %handle.id, side = %plan.side, quantity, "submitted order plan");
        Ok(handle)
    }

    async fn cancel_open_entries(&self) -> Result<(), BrokerError> {
        let mut orders = self.open_orders.lock().unwrap();
        for order in orders.iter_mut() {
            order.status = OrderStatus::Cancelled;
        }
        orders.retain(|o| o.status != OrderStatus::Cancelled);
        Ok(())
    }

    async fn submit_market_order(
        &self,
        side: Side,
        quantity: f64,
    ) -> Result<OrderHandle, BrokerError> {
        let handle = OrderHandle {
            id: self.next_order_id(),
            side,
            quantity,
            status: OrderStatus::Filled,
        };
        tracing::debug!(order = %handle.id, %side, quantity, "submitted market order");
        Ok(handle)
    }

    async fn get_open_orders(&self) -> Result<Vec<OrderHandle>, BrokerError> {
        Ok(self.open_orders.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratkit_risk::TakeProfitLeg;

    fn plan() -> OrderPlan {
        OrderPlan {
            side: Side::Buy,
            entry_price: 100.0,
            stop_loss: Some(95.0),
            take_profits: vec![TakeProfitLeg { price: 110.0, size_ratio: 1.0 }],
        }
    }

    #[tokio::test]
    async fn sequential_submissions_get_distinct_monotonic_ids() {
        let adapter = MockBrokerAdapter::new();
        let first = adapter.submit_order_plan(&plan(), 1.0).await.unwrap();
        let second = adapter.submit_order_plan(&plan(), 1.0).await.unwrap();
        assert_eq!(first.id, OrderId(1));
        assert_eq!(second.id, OrderId(2));
    }

    #[tokio::test]
    async fn cancel_open_entries_empties_the_open_order_list() {
        let adapter = MockBrokerAdapter::new();
        adapter.submit_order_plan(&plan(), 1.0).await.unwrap();
        adapter.cancel_open_entries().await.unwrap();
        assert!(adapter.get_open_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn an_invalid_plan_is_rejected_before_any_state_changes() {
        let adapter = MockBrokerAdapter::new();
        let mut bad = plan();
        bad.stop_loss = Some(101.0);
        assert!(adapter.submit_order_plan(&bad, 1.0).await.is_err());
        assert!(adapter.get_open_orders().await.unwrap().is_empty());
    }
}
