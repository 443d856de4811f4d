use smol_str::SmolStr;
use stratkit_execution::BrokerError;
use stratkit_ta::FeatureError;

/// One diagnostic recorded against a processed bar. Runtime errors never
/// panic or abort a bar (`spec.md` §7: "the engine never panics"); they
/// accumulate here instead, bounded by [`crate::EngineConfig::log_capacity`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeLog {
    OutOfOrderBar {
        previous: i64,
        received: i64,
    },
    FeatureError {
        feature: SmolStr,
        error: FeatureError,
    },
    /// Three consecutive `FeatureError`s on the same feature (`spec.md`
    /// §4.4: "a sticky `DegradedFeature` flag").
    DegradedFeature {
        feature: SmolStr,
    },
    BrokerError {
        action: &'static str,
        error: BrokerError,
    },
    RiskLimitExceeded {
        plan: SmolStr,
        reason: String,
    },
}
