use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::HashMap;
use stratkit_core::{Bar, StrategyState};

/// Everything about a running strategy that must survive a restart:
/// current FSM vertex, bounded bar history, and outstanding timers.
/// Feature values are deliberately excluded — they are recomputed from
/// `history` on the next bar, per the "no hidden state" rule the feature
/// library relies on for deterministic replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    pub current_state: StrategyState,
    pub last_bar_timestamp: Option<i64>,
    history: Vec<Bar>,
    history_capacity: usize,
    /// Timer name to the bar timestamp at which it expires.
    pub timers: HashMap<SmolStr, i64>,
    pub open_order_plan: Option<SmolStr>,
    /// The current trailing-stop level, maintained by the MANAGING default
    /// loopback (`spec.md` §4.4 step 7) and by explicit `AdjustStop` actions.
    pub trailing_stop: Option<f64>,
    /// The most favorable price seen since the trailing stop started
    /// tracking the open position; reset whenever the position closes.
    trailing_stop_extreme: Option<f64>,
    /// Consecutive per-bar `FeatureError` count, keyed by feature name, used
    /// to raise the sticky `DegradedFeature` flag after three in a row.
    feature_error_streak: HashMap<SmolStr, u32>,
    /// Cumulative realised loss for the current trading day, checked
    /// against `BrokerEnv::daily_loss_limit` before a new entry is
    /// submitted.
    pub realised_loss_today: Decimal,
}

impl RuntimeState {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            current_state: StrategyState::idle(),
            last_bar_timestamp: None,
            history: Vec::with_capacity(history_capacity),
            history_capacity,
            timers: HashMap::new(),
            open_order_plan: None,
            trailing_stop: None,
            trailing_stop_extreme: None,
            feature_error_streak: HashMap::new(),
            realised_loss_today: Decimal::ZERO,
        }
    }

    /// Clears trailing-stop tracking, called whenever the open position
    /// closes (an entry is cancelled or exited).
    pub fn reset_trailing_stop(&mut self) {
        self.trailing_stop = None;
        self.trailing_stop_extreme = None;
    }

    /// Advances the trailing stop toward `favorable_price` (the bar's high
    /// for a long position, its low for a short one) by at most
    /// `trail_distance`, never loosening it. Returns `true` if the stop
    /// moved.
    pub fn advance_trailing_stop(&mut self, favorable_price: f64, trail_distance: f64, is_long: bool) -> bool {
        let extreme = self.trailing_stop_extreme.get_or_insert(favorable_price);
        if is_long {
            if favorable_price > *extreme {
                *extreme = favorable_price;
            }
        } else if favorable_price < *extreme {
            *extreme = favorable_price;
        }
        let candidate = if is_long {
            *extreme - trail_distance
        } else {
            *extreme + trail_distance
        };
        let improves = match self.trailing_stop {
            Some(current) if is_long => candidate > current,
            Some(current) => candidate < current,
            None => true,
        };
        if improves {
            self.trailing_stop = Some(candidate);
        }
        improves
    }

    /// Records which features in `plan` errored this bar, returning the
    /// names that just crossed the three-consecutive-error threshold.
    pub fn record_feature_errors(&mut self, plan: &[SmolStr], errored: &std::collections::HashSet<SmolStr>) -> Vec<SmolStr> {
        let mut newly_degraded = Vec::new();
        for name in plan {
            let streak = self.feature_error_streak.entry(name.clone()).or_insert(0);
            if errored.contains(name) {
                *streak += 1;
                if *streak == 3 {
                    newly_degraded.push(name.clone());
                }
            } else {
                *streak = 0;
            }
        }
        newly_degraded
    }

    /// Prior bars, oldest first, not including whatever bar is currently
    /// being processed.
    pub fn history(&self) -> &[Bar] {
        &self.history
    }

    /// Appends `bar` to the ring, evicting the oldest entry once
    /// `history_capacity` is exceeded.
    pub fn push_bar(&mut self, bar: Bar) {
        if self.history.len() == self.history_capacity {
            self.history.remove(0);
        }
        self.history.push(bar);
    }

    /// Timer names that have expired as of `reference_timestamp`, removing
    /// them from the active set.
    pub fn drain_expired_timers(&mut self, reference_timestamp: i64) -> Vec<SmolStr> {
        let expired: Vec<SmolStr> = self
            .timers
            .iter()
            .filter(|(_, &expiry)| expiry <= reference_timestamp)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &expired {
            self.timers.remove(name);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64) -> Bar {
        Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0).unwrap()
    }

    #[test]
    fn history_ring_evicts_the_oldest_entry_once_full() {
        let mut state = RuntimeState::new(3);
        for ts in 0..5 {
            state.push_bar(bar(ts));
        }
        let history: Vec<i64> = state.history().iter().map(|b| b.timestamp).collect();
        assert_eq!(history, vec![2, 3, 4]);
    }

    #[test]
    fn expired_timers_are_drained_and_removed() {
        let mut state = RuntimeState::new(10);
        state.timers.insert("cooldown".into(), 1_000);
        state.timers.insert("long_wait".into(), 5_000);
        let expired = state.drain_expired_timers(2_000);
        assert_eq!(expired, vec![SmolStr::from("cooldown")]);
        assert!(!state.timers.contains_key("cooldown"));
        assert!(state.timers.contains_key("long_wait"));
    }
}
