//! American odds ↔ implied probability conversion.
//!
//! American odds are a signed price convention: a positive value is the
//! profit per 100 staked on an underdog, a negative value the stake
//! required to profit 100 on a favorite. Magnitudes below 100 (other
//! than the 0 sentinel for missing data) do not occur.

/// Implied probability for an American-odds price.
///
/// Callers must never pass 0: zero prices mark missing data and are
/// filtered before any conversion.
pub fn american_to_probability(odds: f64) -> f64 {
    if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        odds.abs() / (odds.abs() + 100.0)
    }
}

/// American-odds price for a probability strictly inside (0, 1).
///
/// Probabilities at or above 0.5 map to a negative (favorite) price,
/// below 0.5 to a positive (underdog) price. Undefined for prob <= 0 or
/// prob >= 1; callers must guard.
pub fn probability_to_american(prob: f64) -> f64 {
    if prob >= 0.5 {
        -100.0 * prob / (1.0 - prob)
    } else {
        100.0 / prob - 100.0
    }
}
