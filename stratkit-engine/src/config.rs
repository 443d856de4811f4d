use serde::{Deserialize, Serialize};

/// Tunables for a running [`crate::Engine`] that have no bearing on
/// strategy semantics: buffer sizes and the timezone bars are presumed to
/// be stamped in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many prior bars are retained for indicators that look back
    /// further than one bar (e.g. `high_252`).
    pub history_capacity: usize,
    /// How many recent [`crate::BarOutcome`]s the engine keeps for
    /// diagnostics/replay inspection.
    pub log_capacity: usize,
    /// IANA timezone name the exchange's trading day resets in; used by
    /// `vwap`'s day-boundary reset.
    pub exchange_timezone: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 260,
            log_capacity: 1024,
            exchange_timezone: "UTC".to_string(),
        }
    }
}
