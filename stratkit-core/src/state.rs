use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// A vertex of a strategy's finite state machine.
///
/// The five canonical states (`IDLE`, `ARMED`, `PLACED`, `MANAGING`,
/// `EXITED`) are always available; a document may declare additional labels
/// in its `states` section to extend the set. Identity is purely by label —
/// there is no hidden enum discriminant — so custom states compare equal to
/// a canonical one sharing the same name.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyState(SmolStr);

impl StrategyState {
    pub const IDLE: &'static str = "IDLE";
    pub const ARMED: &'static str = "ARMED";
    pub const PLACED: &'static str = "PLACED";
    pub const MANAGING: &'static str = "MANAGING";
    pub const EXITED: &'static str = "EXITED";

    const CANONICAL: [&'static str; 5] = [
        Self::IDLE,
        Self::ARMED,
        Self::PLACED,
        Self::MANAGING,
        Self::EXITED,
    ];

    pub fn new(label: impl Into<SmolStr>) -> Self {
        Self(label.into())
    }

    pub fn idle() -> Self {
        Self::new(Self::IDLE)
    }

    pub fn exited() -> Self {
        Self::new(Self::EXITED)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True for the five states named directly in `spec.md` §3.
    pub fn is_canonical(&self) -> bool {
        Self::CANONICAL.contains(&self.0.as_str())
    }

    /// The five canonical state labels, always implicitly known to the
    /// compiler even when a strategy document doesn't redeclare them.
    pub fn canonical_labels() -> [&'static str; 5] {
        Self::CANONICAL
    }

    /// `EXITED` is the only terminal state: no outbound transition may leave it.
    pub fn is_terminal(&self) -> bool {
        self.0.as_str() == Self::EXITED
    }
}

impl Display for StrategyState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StrategyState {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StrategyState {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_states_are_recognised() {
        assert!(StrategyState::idle().is_canonical());
        assert!(StrategyState::new("MANAGING").is_canonical());
        assert!(!StrategyState::new("WAITING_FOR_FILL").is_canonical());
    }

    #[test]
    fn only_exited_is_terminal() {
        assert!(StrategyState::exited().is_terminal());
        assert!(!StrategyState::idle().is_terminal());
    }

    #[test]
    fn equality_is_by_label() {
        assert_eq!(StrategyState::new("ARMED"), StrategyState::from("ARMED"));
    }
}
