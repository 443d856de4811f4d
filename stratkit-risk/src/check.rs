use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// General interface for a single risk validation over some `Input`.
///
/// Mirrors the layout of a generic upper-bound check: a small, composable
/// unit that either passes or explains precisely why it didn't.
pub trait RiskCheck {
    type Input;
    type Error;

    fn name() -> &'static str;

    fn check(&self, input: &Self::Input) -> Result<(), Self::Error>;
}

/// Passes while `input <= limit`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Constructor)]
pub struct CheckHigherThan<T> {
    pub limit: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Constructor, Error)]
#[error("{context}: input {input} exceeds limit {limit}")]
pub struct CheckFailHigherThan<T: std::fmt::Display> {
    pub context: &'static str,
    pub limit: T,
    pub input: T,
}

impl<T> RiskCheck for CheckHigherThan<T>
where
    T: Clone + Copy + PartialOrd + std::fmt::Display,
{
    type Input = T;
    type Error = CheckFailHigherThan<T>;

    fn name() -> &'static str {
        "CheckHigherThan"
    }

    fn check(&self, input: &Self::Input) -> Result<(), Self::Error> {
        if *input <= self.limit {
            Ok(())
        } else {
            Err(CheckFailHigherThan::new("CheckHigherThan", self.limit, *input))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn passes_at_the_limit() {
        let check = CheckHigherThan::new(dec!(100));
        assert!(check.check(&dec!(100)).is_ok());
    }

    #[test]
    fn fails_above_the_limit() {
        let check = CheckHigherThan::new(dec!(100));
        let err = check.check(&dec!(100.01)).unwrap_err();
        assert_eq!(err.limit, dec!(100));
    }
}
