use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::engine::Engine;
use crate::state::RuntimeState;
use stratkit_execution::BrokerAdapter;

/// Serializable capture of an [`Engine`]'s [`RuntimeState`], persisted
/// between restarts. Everything else an `Engine` holds — the compiled IR,
/// the feature registry, the broker adapter — is reconstructed by the
/// caller from the same inputs used to build the original engine rather
/// than serialized, since an IR and a live broker connection aren't
/// portable across a process boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub symbol: SmolStr,
    pub state: RuntimeState,
}

impl EngineSnapshot {
    pub fn capture<A: BrokerAdapter>(symbol: impl Into<SmolStr>, engine: &Engine<A>) -> Self {
        Self {
            symbol: symbol.into(),
            state: engine.snapshot(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn apply<A: BrokerAdapter>(self, engine: Engine<A>) -> Engine<A> {
        engine.restore(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratkit_core::StrategyState;

    #[test]
    fn round_trips_through_json() {
        let mut state = RuntimeState::new(10);
        state.current_state = StrategyState::new("ARMED");
        let snapshot = EngineSnapshot {
            symbol: "BTC-USD".into(),
            state,
        };
        let json = snapshot.to_json().unwrap();
        let restored = EngineSnapshot::from_json(&json).unwrap();
        assert_eq!(restored.symbol, "BTC-USD");
        assert_eq!(restored.state.current_state, StrategyState::new("ARMED"));
    }
}
