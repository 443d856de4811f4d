//! Deterministic, wire-stable pattern detectors.
//!
//! `spec.md` §6 pins the cup-and-handle thresholds and confidence formula
//! down as contract, not as implementation guidance: two independent
//! implementations must agree bit-for-bit on the confidence score. Every
//! constant below is copied verbatim from there.

use stratkit_core::Bar;

/// Result of a cup-and-handle scan: whether the pattern is present, and if
/// so a `[0, 100]` confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CupAndHandle {
    pub detected: bool,
    pub confidence: f64,
}

const MIN_SAMPLES: usize = 100;
const EXTREMUM_WINDOW: usize = 10;
const MIN_CUP_WIDTH: usize = 20;
const CUP_DEPTH_MIN_PCT: f64 = 15.0;
const CUP_DEPTH_MAX_PCT: f64 = 50.0;
const MAX_PEAK_DIFF_PCT: f64 = 15.0;
const HANDLE_DEPTH_MIN_PCT: f64 = 5.0;
const HANDLE_DEPTH_MAX_PCT: f64 = 15.0;
const HANDLE_BONUS: f64 = 20.0;
const CONFIDENCE_DEPTH_TARGET: f64 = 25.0;
const CONFIDENCE_PEAK_DIFF_TARGET: f64 = 5.0;
const DETECTION_THRESHOLD: f64 = 70.0;

/// `true` if `series[i].high` is the highest high within `EXTREMUM_WINDOW`
/// bars on either side.
fn is_local_max(series: &[Bar], i: usize) -> bool {
    let lo = i.saturating_sub(EXTREMUM_WINDOW);
    let hi = (i + EXTREMUM_WINDOW).min(series.len() - 1);
    let pivot = series[i].high;
    (lo..=hi).all(|j| series[j].high <= pivot)
}

/// `true` if `series[i].low` is the lowest low within `EXTREMUM_WINDOW` bars
/// on either side.
fn is_local_min(series: &[Bar], i: usize) -> bool {
    let lo = i.saturating_sub(EXTREMUM_WINDOW);
    let hi = (i + EXTREMUM_WINDOW).min(series.len() - 1);
    let pivot = series[i].low;
    (lo..=hi).all(|j| series[j].low >= pivot)
}

/// Local maxima with a full `EXTREMUM_WINDOW` of context on both sides,
/// ascending by index.
fn local_maxima(series: &[Bar]) -> Vec<usize> {
    if series.len() <= 2 * EXTREMUM_WINDOW {
        return Vec::new();
    }
    (EXTREMUM_WINDOW..series.len() - EXTREMUM_WINDOW)
        .filter(|&i| is_local_max(series, i))
        .collect()
}

/// Local minima with a full `EXTREMUM_WINDOW` of context on both sides,
/// ascending by index.
fn local_minima(series: &[Bar]) -> Vec<usize> {
    if series.len() <= 2 * EXTREMUM_WINDOW {
        return Vec::new();
    }
    (EXTREMUM_WINDOW..series.len() - EXTREMUM_WINDOW)
        .filter(|&i| is_local_min(series, i))
        .collect()
}

/// Scans `series` for a cup-and-handle: a left peak, a trough at least
/// [`MIN_CUP_WIDTH`] bars later whose depth is 15-50% of the left peak, a
/// right peak within 15% of the left peak's price, and a handle — a
/// pullback after the right peak whose depth is 5-15% of the right peak.
///
/// Per `spec.md` §6 the confidence score is
/// `100 - |depth% - 25| - |peakDiff% - 5| + 20` (handle bonus), clipped to
/// `[0, 100]`; the pattern is detected iff confidence `>= 70`.
pub fn cup_and_handle(series: &[Bar]) -> CupAndHandle {
    let none = CupAndHandle {
        detected: false,
        confidence: 0.0,
    };
    if series.len() < MIN_SAMPLES {
        return none;
    }

    let maxima = local_maxima(series);
    let minima = local_minima(series);

    for &left_peak_idx in &maxima {
        let left_high = series[left_peak_idx].high;
        if left_high <= 0.0 {
            continue;
        }

        let Some(&trough_idx) = minima.iter().find(|&&idx| idx > left_peak_idx) else {
            continue;
        };
        let trough_low = series[trough_idx].low;

        let Some(&right_peak_idx) = maxima.iter().find(|&&idx| idx > trough_idx) else {
            continue;
        };
        if right_peak_idx - left_peak_idx < MIN_CUP_WIDTH {
            continue;
        }
        let right_high = series[right_peak_idx].high;
        if right_high <= 0.0 {
            continue;
        }

        let peak_diff_pct = 100.0 * (left_high - right_high).abs() / left_high;
        if peak_diff_pct > MAX_PEAK_DIFF_PCT {
            continue;
        }

        let depth_pct = 100.0 * (left_high - trough_low) / left_high;
        if !(CUP_DEPTH_MIN_PCT..=CUP_DEPTH_MAX_PCT).contains(&depth_pct) {
            continue;
        }

        let handle = &series[right_peak_idx + 1..];
        if handle.is_empty() {
            continue;
        }
        let handle_low = handle.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let handle_depth_pct = 100.0 * (right_high - handle_low) / right_high;
        if !(HANDLE_DEPTH_MIN_PCT..=HANDLE_DEPTH_MAX_PCT).contains(&handle_depth_pct) {
            continue;
        }

        let confidence = (100.0
            - (depth_pct - CONFIDENCE_DEPTH_TARGET).abs()
            - (peak_diff_pct - CONFIDENCE_PEAK_DIFF_TARGET).abs()
            + HANDLE_BONUS)
            .clamp(0.0, 100.0);

        return CupAndHandle {
            detected: confidence >= DETECTION_THRESHOLD,
            confidence,
        };
    }

    none
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratkit_core::Bar;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close + 0.3, close - 0.3, close, 10.0).unwrap()
    }

    /// Linearly interpolates `len` bars (inclusive of both ends) from
    /// `start` to `end`, appending them to `series`.
    fn ramp(series: &mut Vec<Bar>, ts: &mut i64, len: usize, start: f64, end: f64) {
        for i in 0..len {
            let t = i as f64 / (len - 1) as f64;
            series.push(bar(*ts, start + (end - start) * t));
            *ts += 1;
        }
    }

    /// A textbook cup-and-handle: a strictly-monotonic lead-in up to a left
    /// peak at 100, a strictly-monotonic 25%-deep trough at 75 some 50 bars
    /// later, a right peak at 95 (within 5% of the left peak), and a
    /// `handle_depth_pct` pullback off the right peak before a flat tail.
    /// Every segment is strictly monotonic so local extrema are unambiguous
    /// under a 10-bar window.
    fn cup_series(handle_depth_pct: f64) -> Vec<Bar> {
        let mut series = Vec::new();
        let mut ts = 0i64;

        ramp(&mut series, &mut ts, 15, 90.0, 95.0); // lead-in
        ramp(&mut series, &mut ts, 5, 96.0, 100.0); // rise to the left peak (idx 19)
        ramp(&mut series, &mut ts, 25, 99.0, 75.0); // descend to the trough (idx 44)
        ramp(&mut series, &mut ts, 25, 76.0, 94.0); // ascend back out (stops below the right peak)
        series.push(bar(ts, 95.0)); // right peak (idx 69)
        ts += 1;

        let handle_low = 95.0 * (1.0 - handle_depth_pct / 100.0);
        ramp(&mut series, &mut ts, 6, 94.0, handle_low); // handle pullback
        ramp(&mut series, &mut ts, 24, handle_low + 1.0, 90.0); // flat-ish tail, above the handle low

        series
    }

    #[test]
    fn detects_a_textbook_cup_and_handle_above_the_confidence_threshold() {
        let series = cup_series(10.0);
        let result = cup_and_handle(&series);
        assert!(result.detected, "{result:?}");
        assert!(result.confidence >= DETECTION_THRESHOLD, "{result:?}");
        assert!(result.confidence <= 100.0);
    }

    #[test]
    fn fewer_than_the_minimum_sample_count_never_detects() {
        let series: Vec<Bar> = (0..MIN_SAMPLES - 1).map(|i| bar(i as i64, 100.0)).collect();
        let result = cup_and_handle(&series);
        assert!(!result.detected);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn a_handle_pullback_outside_the_5_to_15_percent_band_is_not_detected() {
        // A 1%-deep handle is too shallow to count as a real pullback.
        let series = cup_series(1.0);
        let result = cup_and_handle(&series);
        assert!(!result.detected, "{result:?}");
    }
}
