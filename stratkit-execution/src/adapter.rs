use crate::error::BrokerError;
use crate::order::OrderHandle;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use stratkit_core::Side;
use stratkit_risk::OrderPlan;
use std::future::Future;

/// Static description of the account/venue an engine instance trades
/// against. Carried alongside the adapter rather than baked into it so the
/// same adapter implementation can serve several symbols.
///
/// Per `spec.md` §6, every broker operation is conceptually scoped to one of
/// these: `{accountId, dryRun, allowLiveOrders, perSymbolOrderCap,
/// maxOrderQty, maxNotionalPerSymbol, dailyLossLimit}`. The risk-relevant
/// fields are consumed by [`crate::BrokerAdapter`] callers (the engine) via
/// `stratkit_risk::BrokerRiskLimits`, not by the adapter itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerEnv {
    pub symbol: SmolStr,
    pub account_id: SmolStr,
    /// When true, the adapter must not place, cancel, or otherwise mutate
    /// real broker state; every call still returns a result as if it had.
    pub paper_trading: bool,
    /// Must be true for `paper_trading: false` to have any real-money
    /// effect; a second, explicit switch an operator has to flip.
    pub allow_live_orders: bool,
    /// Maximum number of concurrently open entry orders for this symbol.
    pub per_symbol_order_cap: u32,
    pub max_order_qty: Decimal,
    pub max_notional_per_symbol: Decimal,
    pub daily_loss_limit: Decimal,
}

impl BrokerEnv {
    /// A paper-trading-safe environment with no live-order switch and
    /// effectively unlimited risk caps, suitable for tests and dry runs.
    /// Use [`BrokerEnv::with_risk_limits`] to tighten the caps.
    pub fn new(symbol: impl Into<SmolStr>, paper_trading: bool) -> Self {
        let symbol = symbol.into();
        Self {
            account_id: symbol.clone(),
            symbol,
            paper_trading,
            allow_live_orders: false,
            per_symbol_order_cap: 1,
            max_order_qty: Decimal::MAX,
            max_notional_per_symbol: Decimal::MAX,
            daily_loss_limit: Decimal::MAX,
        }
    }

    pub fn with_account_id(mut self, account_id: impl Into<SmolStr>) -> Self {
        self.account_id = account_id.into();
        self
    }

    pub fn with_risk_limits(
        mut self,
        max_order_qty: Decimal,
        max_notional_per_symbol: Decimal,
        daily_loss_limit: Decimal,
    ) -> Self {
        self.max_order_qty = max_order_qty;
        self.max_notional_per_symbol = max_notional_per_symbol;
        self.daily_loss_limit = daily_loss_limit;
        self
    }

    pub fn with_allow_live_orders(mut self, allow_live_orders: bool) -> Self {
        self.allow_live_orders = allow_live_orders;
        self
    }

    pub fn with_per_symbol_order_cap(mut self, per_symbol_order_cap: u32) -> Self {
        self.per_symbol_order_cap = per_symbol_order_cap;
        self
    }

    /// The [`stratkit_risk::BrokerRiskLimits`] this environment's caps
    /// describe, for a caller (the engine) to check proposed orders against
    /// before calling the adapter.
    pub fn risk_limits(&self) -> stratkit_risk::BrokerRiskLimits {
        stratkit_risk::BrokerRiskLimits::new(
            self.max_order_qty,
            self.max_notional_per_symbol,
            self.daily_loss_limit,
        )
    }
}

/// The contract a broker integration must satisfy for the engine to drive
/// it. Modeled as return-position-impl-trait-in-trait rather than
/// `#[async_trait]`: no boxed futures on the hot path, and implementers
/// stay `Send` by construction.
pub trait BrokerAdapter: Clone + Send + Sync {
    /// Submits an entry plus its protective/bracket legs as a single unit.
    /// `quantity` is the base-asset size of the entry leg; bracket legs
    /// scale by their configured `size_ratio`.
    fn submit_order_plan(
        &self,
        plan: &OrderPlan,
        quantity: f64,
    ) -> impl Future<Output = Result<OrderHandle, BrokerError>> + Send;

    /// Cancels every still-open entry order for the adapter's symbol,
    /// leaving any already-filled position and its brackets untouched.
    fn cancel_open_entries(&self) -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Submits an unconditional market order, used for manual exits
    /// (`Action::ExitPosition`, `Action::MarketSell`-style actions).
    fn submit_market_order(
        &self,
        side: Side,
        quantity: f64,
    ) -> impl Future<Output = Result<OrderHandle, BrokerError>> + Send;

    /// Lists every order the adapter currently considers open.
    fn get_open_orders(&self) -> impl Future<Output = Result<Vec<OrderHandle>, BrokerError>> + Send;
}
