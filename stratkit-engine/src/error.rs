use thiserror::Error;

/// Errors that stop `process_bar` before it produces a [`crate::BarOutcome`]
/// at all. Broker failures are not among these: per `spec.md` §4.4/§7 they
/// never roll back an already-committed state transition, so they surface
/// as a [`crate::RuntimeLog::BrokerError`] on the outcome instead of here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("bar at {received} is not after the last processed bar at {previous}")]
    OutOfOrderBar { previous: i64, received: i64 },
}
