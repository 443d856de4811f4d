use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One closed OHLCV market interval.
///
/// `timestamp` is monotonic milliseconds since epoch. A [`Bar`] is immutable
/// once constructed; [`Bar::new`] is the only constructor and enforces the
/// invariant `low <= min(open, close) <= max(open, close) <= high` and
/// non-negative volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Error returned when a [`Bar`] fails its OHLCV invariants.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BarError {
    #[error("bar volume {0} is negative")]
    NegativeVolume(f64),
    #[error("bar low {low} exceeds min(open, close) {min_oc}")]
    LowAboveBody { low: f64, min_oc: f64 },
    #[error("bar high {high} is below max(open, close) {max_oc}")]
    HighBelowBody { high: f64, max_oc: f64 },
}

impl Bar {
    /// Construct a new [`Bar`], validating the OHLCV invariants.
    pub fn new(
        timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BarError> {
        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        let min_oc = open.min(close);
        let max_oc = open.max(close);

        if low > min_oc {
            return Err(BarError::LowAboveBody { low, min_oc });
        }
        if high < max_oc {
            return Err(BarError::HighBelowBody { high, max_oc });
        }

        Ok(Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Typical price, used by VWAP: `(high + low + close) / 3`.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bar_constructs() {
        let bar = Bar::new(1_000, 10.0, 11.0, 9.5, 10.5, 100.0).unwrap();
        assert_eq!(bar.close, 10.5);
    }

    #[test]
    fn rejects_negative_volume() {
        let err = Bar::new(1_000, 10.0, 11.0, 9.5, 10.5, -1.0).unwrap_err();
        assert_eq!(err, BarError::NegativeVolume(-1.0));
    }

    #[test]
    fn rejects_low_above_body() {
        let err = Bar::new(1_000, 10.0, 11.0, 10.2, 10.5, 1.0).unwrap_err();
        assert!(matches!(err, BarError::LowAboveBody { .. }));
    }

    #[test]
    fn rejects_high_below_body() {
        let err = Bar::new(1_000, 10.0, 10.4, 9.0, 10.5, 1.0).unwrap_err();
        assert!(matches!(err, BarError::HighBelowBody { .. }));
    }
}
