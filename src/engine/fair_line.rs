//! Fair-line estimation from multi-bookmaker odds.
//!
//! For the moneyline market, each bookmaker's implied probabilities are
//! normalized by their sum first, removing that bookmaker's individual
//! overround, before being averaged per outcome across books. The
//! averaged set is then renormalized to sum to exactly 1, which guards
//! against residual drift when bookmakers quote different outcome
//! subsets (2-way vs 3-way markets).
//!
//! Spread and total markets are price-averaged with no de-vig
//! applied. A known simplification, not a bug.

use std::collections::BTreeMap;

use crate::odds::{american_to_probability, probability_to_american};
use crate::types::{FairLine, FairOutcome, GameRecord, MarketKind};

/// Estimate the consensus fair line for one game.
///
/// Pure function of the record: no I/O, no hidden state. Markets with
/// zero qualifying bookmaker entries are omitted from the result.
pub fn estimate(game: &GameRecord) -> FairLine {
    FairLine {
        moneyline: moneyline_fair(game),
        spread: average_price(game, MarketKind::Spread),
        total: average_price(game, MarketKind::Total),
    }
}

/// Per-outcome de-vigged fair probabilities for the moneyline market.
fn moneyline_fair(game: &GameRecord) -> BTreeMap<String, FairOutcome> {
    // Accumulate each bookmaker's normalized probabilities per outcome name.
    let mut accum: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for book in &game.bookmakers {
        for market in &book.markets {
            if market.kind != MarketKind::Moneyline {
                continue;
            }

            let mut book_probs: Vec<(&str, f64)> = Vec::new();
            for outcome in &market.outcomes {
                if outcome.name.is_empty() || outcome.price == 0.0 || !outcome.price.is_finite() {
                    continue;
                }
                let prob = american_to_probability(outcome.price);
                if prob > 0.0 {
                    book_probs.push((outcome.name.as_str(), prob));
                }
            }

            // The sum exceeds 1.0 by this bookmaker's margin; dividing by
            // it removes the overround. A non-positive sum means no
            // usable data from this bookmaker.
            let overround: f64 = book_probs.iter().map(|(_, p)| p).sum();
            if overround <= 0.0 {
                continue;
            }
            for (name, prob) in book_probs {
                accum.entry(name).or_default().push(prob / overround);
            }
        }
    }

    if accum.is_empty() {
        return BTreeMap::new();
    }

    // Average the normalized probabilities per outcome across books.
    let averaged: Vec<(&str, f64)> = accum
        .iter()
        .map(|(name, probs)| (*name, probs.iter().sum::<f64>() / probs.len() as f64))
        .collect();

    // Renormalize the means so the full outcome set sums to exactly 1.
    let total: f64 = averaged.iter().map(|(_, p)| p).sum();
    if total <= 0.0 {
        return BTreeMap::new();
    }

    let mut fair = BTreeMap::new();
    for (name, mean) in averaged {
        let fair_prob = mean / total;
        // Degenerate single-outcome data would land exactly on 1.0;
        // treated as "no fair line available for this outcome".
        if fair_prob <= 0.0 || fair_prob >= 1.0 {
            continue;
        }
        fair.insert(
            name.to_string(),
            FairOutcome {
                fair_prob,
                fair_odds: probability_to_american(fair_prob),
            },
        );
    }
    fair
}

/// Arithmetic mean of the raw American prices for a spread/total market
/// across all bookmakers offering it. `None` when no bookmaker does.
fn average_price(game: &GameRecord, kind: MarketKind) -> Option<f64> {
    let mut prices: Vec<f64> = Vec::new();
    for book in &game.bookmakers {
        for market in &book.markets {
            if market.kind != kind {
                continue;
            }
            for outcome in &market.outcomes {
                if outcome.price != 0.0 && outcome.price.is_finite() {
                    prices.push(outcome.price);
                }
            }
        }
    }
    if prices.is_empty() {
        None
    } else {
        Some(prices.iter().sum::<f64>() / prices.len() as f64)
    }
}
