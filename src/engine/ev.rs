//! Expected value per unit stake.

use crate::odds::american_to_probability;

/// Expected profit per unit stake when taking `book_odds` against a
/// consensus `fair_odds` price.
///
/// Returns 0.0 for unusable inputs: zero or non-finite odds, or a fair
/// probability that falls outside the open interval (0, 1). Callers are
/// contractually required to filter zero prices beforehand; this is the
/// only sentinel the engine offers.
pub fn compute_ev(book_odds: f64, fair_odds: f64) -> f64 {
    if !book_odds.is_finite() || !fair_odds.is_finite() {
        return 0.0;
    }
    if book_odds == 0.0 || fair_odds == 0.0 {
        return 0.0;
    }

    let fair_prob = american_to_probability(fair_odds);
    if fair_prob <= 0.0 || fair_prob >= 1.0 {
        return 0.0;
    }

    let profit_per_unit = if book_odds > 0.0 {
        book_odds / 100.0
    } else {
        100.0 / book_odds.abs()
    };

    fair_prob * profit_per_unit - (1.0 - fair_prob)
}
