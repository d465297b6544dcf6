//! Utilities for working with probabilities and percentages.

pub const HUNDRED: f64 = 100.0;

/// Clamps a percentage into `[0, 100]`, absorbing floating-point drift. `NaN` clamps to zero.
#[inline]
pub fn clamp_pct(pct: f64) -> f64 {
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, HUNDRED)
    }
}

/// Converts a probability in `[0, 1]` to a clamped percentage.
#[inline]
pub fn to_pct(prob: f64) -> f64 {
    clamp_pct(prob * HUNDRED)
}

/// The bookmaker-implied probability of a decimal price.
#[inline]
pub fn implied_prob(decimal_price: f64) -> f64 {
    1.0 / decimal_price
}
