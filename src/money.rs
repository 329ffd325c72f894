//! Currency rounding.

/// Rounds to the nearest cent, halves away from zero.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
