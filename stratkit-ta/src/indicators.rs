//! Pure indicator math. Every function here recomputes its result from the
//! full bar series handed to it; none of them retain state between calls.
//!
//! Formulas and edge-case fallbacks follow `spec.md` §4.2 exactly, including
//! the wire-stable constants (smoothing periods, fallback values) called
//! out there.

use stratkit_core::Bar;

fn closes(series: &[Bar]) -> Vec<f64> {
    series.iter().map(|b| b.close).collect()
}

/// Simple moving average of the last `period` closes.
///
/// Fallback: if fewer than `period` bars are available, averages whatever
/// is present (the arithmetic mean of the whole series).
pub fn sma(series: &[Bar], period: usize) -> f64 {
    let closes = closes(series);
    let window = window_slice(&closes, period);
    mean(window)
}

fn window_slice(values: &[f64], period: usize) -> &[f64] {
    if values.len() <= period {
        values
    } else {
        &values[values.len() - period..]
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Exponential moving average seeded with an SMA of the first `period`
/// closes, smoothing constant `alpha = 2 / (period + 1)`.
///
/// Fallback: with fewer than `period` bars, the seed SMA covers whatever is
/// available and no further smoothing is applied.
pub fn ema(series: &[Bar], period: usize) -> f64 {
    ema_series(&closes(series), period)
        .last()
        .copied()
        .unwrap_or(f64::NAN)
}

/// Full EMA series aligned with `values`, used internally by MACD so the
/// signal line can be derived from the MACD line's own history.
fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let seed_len = period.min(values.len());
    let seed = mean(&values[..seed_len]);
    let alpha = 2.0 / (period as f64 + 1.0);

    let mut out = Vec::with_capacity(values.len());
    out.push(seed);
    for &v in &values[seed_len..] {
        let prev = *out.last().unwrap();
        out.push(alpha * v + (1.0 - alpha) * prev);
    }
    // Pad the pre-seed region with the seed value so the series stays
    // aligned with `values` by index.
    let mut aligned = vec![seed; seed_len - 1];
    aligned.extend(out);
    aligned
}

/// Wilder's RSI over `period` bars.
///
/// Fallback: fewer than `period + 1` closes yields 50.0; a window with zero
/// average gain and loss is also defined as 50.0.
pub fn rsi(series: &[Bar], period: usize) -> f64 {
    let closes = closes(series);
    if closes.len() < period + 1 {
        return 50.0;
    }
    let window = window_slice(&closes, period + 1);
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gains += delta;
        } else {
            losses += -delta;
        }
    }
    let n = (window.len() - 1) as f64;
    let avg_gain = gains / n;
    let avg_loss = losses / n;
    if avg_gain == 0.0 && avg_loss == 0.0 {
        return 50.0;
    }
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// MACD line, signal line (9-EMA of the MACD line) and histogram, using the
/// conventional 12/26 fast/slow periods.
///
/// Fallback: fewer than 26 closes yields the zero triple.
pub fn macd(series: &[Bar]) -> (f64, f64, f64) {
    let closes = closes(series);
    if closes.len() < 26 {
        return (0.0, 0.0, 0.0);
    }
    let fast = ema_series(&closes, 12);
    let slow = ema_series(&closes, 26);
    let macd_line: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
    let signal_series = ema_series(&macd_line, 9);
    let macd_value = macd_line.last().copied().unwrap_or(f64::NAN);
    let signal_value = signal_series.last().copied().unwrap_or(f64::NAN);
    (macd_value, signal_value, macd_value - signal_value)
}

/// Bollinger bands: SMA middle band, +/- `k` population standard deviations.
///
/// Fallback: while fewer than `period` closes are available, all three
/// bands collapse to the current close.
pub fn bollinger(series: &[Bar], period: usize, k: f64) -> (f64, f64, f64) {
    let closes = closes(series);
    if closes.len() < period {
        let c = closes.last().copied().unwrap_or(f64::NAN);
        return (c, c, c);
    }
    let window = window_slice(&closes, period);
    let middle = mean(window);
    let variance = window.iter().map(|v| (v - middle).powi(2)).sum::<f64>() / window.len() as f64;
    let sd = variance.sqrt();
    (middle + k * sd, middle, middle - k * sd)
}

/// Wilder's Average True Range.
///
/// Fallback: fewer than 2 bars yields 0.0 (no prior close to derive a true
/// range from).
pub fn atr(series: &[Bar], period: usize) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let trs = true_ranges(series);
    wilder_smooth(&trs, period)
}

fn true_ranges(series: &[Bar]) -> Vec<f64> {
    series
        .windows(2)
        .map(|pair| {
            let prev_close = pair[0].close;
            let bar = &pair[1];
            let a = bar.high - bar.low;
            let b = (bar.high - prev_close).abs();
            let c = (bar.low - prev_close).abs();
            a.max(b).max(c)
        })
        .collect()
}

/// Wilder smoothing: seed with a simple average of the first `period`
/// values, then recurrence `prev - prev/period + value`.
fn wilder_smooth(values: &[f64], period: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let seed_len = period.min(values.len());
    let mut acc = mean(&values[..seed_len]);
    for &v in &values[seed_len..] {
        acc = (acc * (period as f64 - 1.0) + v) / period as f64;
    }
    acc
}

/// Wilder's Average Directional Index.
///
/// Fallback: fewer than `period + 1` true ranges available yields 0.0.
pub fn adx(series: &[Bar], period: usize) -> f64 {
    if series.len() < period + 1 {
        return 0.0;
    }
    let trs = true_ranges(series);
    let mut plus_dm = Vec::with_capacity(series.len() - 1);
    let mut minus_dm = Vec::with_capacity(series.len() - 1);
    for pair in series.windows(2) {
        let up_move = pair[1].high - pair[0].high;
        let down_move = pair[0].low - pair[1].low;
        if up_move > down_move && up_move > 0.0 {
            plus_dm.push(up_move);
        } else {
            plus_dm.push(0.0);
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm.push(down_move);
        } else {
            minus_dm.push(0.0);
        }
    }

    let smoothed_tr = wilder_smooth(&trs, period);
    let smoothed_plus = wilder_smooth(&plus_dm, period);
    let smoothed_minus = wilder_smooth(&minus_dm, period);
    if smoothed_tr == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * smoothed_plus / smoothed_tr;
    let minus_di = 100.0 * smoothed_minus / smoothed_tr;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    100.0 * (plus_di - minus_di).abs() / di_sum
}

/// Stochastic oscillator: raw `%K` over `period` bars and its `%D`
/// (simple-moving-average smoothing over `smooth` values of `%K`).
///
/// Fallback: a flat high/low range over the window yields `%K = 50.0`.
pub fn stochastic(series: &[Bar], period: usize, smooth: usize) -> (f64, f64) {
    let n = series.len();
    let take = period.min(n).max(1);
    let mut k_values = Vec::with_capacity(smooth);
    let rounds = smooth.min(n).max(1);
    for i in 0..rounds {
        let end = n - i;
        let start = end.saturating_sub(take);
        let window = &series[start..end];
        let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let close = window.last().map(|b| b.close).unwrap_or(f64::NAN);
        let range = highest - lowest;
        let k = if range == 0.0 {
            50.0
        } else {
            100.0 * (close - lowest) / range
        };
        k_values.push(k);
    }
    let k = k_values.first().copied().unwrap_or(50.0);
    let d = mean(&k_values);
    (k, d)
}

/// Commodity Channel Index over `period` bars using the constant `0.015`
/// mean-deviation scale factor.
///
/// Fallback: zero mean absolute deviation yields `0.0`.
pub fn cci(series: &[Bar], period: usize) -> f64 {
    let typical: Vec<f64> = series.iter().map(|b| b.typical_price()).collect();
    let window = window_slice(&typical, period);
    let sma_tp = mean(window);
    let mean_dev = window.iter().map(|v| (v - sma_tp).abs()).sum::<f64>() / window.len() as f64;
    if mean_dev == 0.0 {
        return 0.0;
    }
    let last = *typical.last().unwrap_or(&f64::NAN);
    (last - sma_tp) / (0.015 * mean_dev)
}

/// Williams %R over `period` bars.
///
/// Fallback (open question resolved in `DESIGN.md`): a flat high/low range
/// yields `-50.0`, the midpoint of the indicator's `[-100, 0]` range.
pub fn williams_r(series: &[Bar], period: usize) -> f64 {
    let window = window_slice(series, period);
    let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let range = highest - lowest;
    if range == 0.0 {
        return -50.0;
    }
    let close = window.last().map(|b| b.close).unwrap_or(f64::NAN);
    -100.0 * (highest - close) / range
}

/// On-Balance Volume, accumulated from the start of the supplied series.
pub fn obv(series: &[Bar]) -> f64 {
    let mut acc = 0.0;
    for pair in series.windows(2) {
        if pair[1].close > pair[0].close {
            acc += pair[1].volume;
        } else if pair[1].close < pair[0].close {
            acc -= pair[1].volume;
        }
    }
    acc
}

/// Cumulative volume-weighted average price, resetting at each UTC day
/// boundary (`timestamp` is epoch milliseconds).
///
/// Fallback: if every bar in the current day has zero volume, VWAP returns
/// the current close.
pub fn vwap(series: &[Bar]) -> f64 {
    const DAY_MS: i64 = 86_400_000;
    let Some(last) = series.last() else {
        return f64::NAN;
    };
    let day = last.timestamp.div_euclid(DAY_MS);
    let mut pv = 0.0;
    let mut volume = 0.0;
    for bar in series.iter().rev() {
        if bar.timestamp.div_euclid(DAY_MS) != day {
            break;
        }
        pv += bar.typical_price() * bar.volume;
        volume += bar.volume;
    }
    if volume == 0.0 {
        last.close
    } else {
        pv / volume
    }
}

/// High minus low of the most recent `period` bars (a simple volatility
/// proxy used by guard expressions as `range_N`).
pub fn rolling_range(series: &[Bar], period: usize) -> f64 {
    let window = window_slice(series, period);
    let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    highest - lowest
}

/// `true` if the `period`-bar SMA of closes is higher now than it was one
/// bar ago. Fewer than `period + 1` bars is treated as not-yet-rising.
pub fn sma_rising(series: &[Bar], period: usize) -> bool {
    if series.len() < period + 1 {
        return false;
    }
    let now = sma(series, period);
    let prior = sma(&series[..series.len() - 1], period);
    now > prior
}

/// Highest high over the trailing `period` bars.
pub fn highest_high(series: &[Bar], period: usize) -> f64 {
    window_slice(series, period)
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Lowest low over the trailing `period` bars.
pub fn lowest_low(series: &[Bar], period: usize) -> f64 {
    window_slice(series, period)
        .iter()
        .map(|b| b.low)
        .fold(f64::INFINITY, f64::min)
}
