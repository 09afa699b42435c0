//! Bounded top-N selection with deterministic fallback.
//!
//! When fewer than `top_n` candidates clear the edge threshold, the
//! remaining slots are filled with the next-best EVs and visibly tagged
//! as fallbacks, so the consumer always knows which entries were quota
//! fill rather than genuine qualifiers.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::info;

use crate::types::Candidate;

/// Select at most `top_n` candidates, sorted by EV descending.
///
/// 1. Candidates with `ev >= min_edge` qualify; if enough qualify, the
///    best `top_n` of them are returned untagged.
/// 2. Otherwise the full set is walked in EV-descending order, appending
///    not-yet-included candidates until the quota is met or the set is
///    exhausted; every appended candidate below `min_edge` is tagged
///    `fallback = true`.
/// 3. The final list is stable-sorted by EV descending (ties keep their
///    original relative order).
///
/// Empty input returns empty; fewer than `top_n` candidates in total
/// returns all of them with no padding.
pub fn select_top(mut candidates: Vec<Candidate>, min_edge: f64, top_n: usize) -> Vec<Candidate> {
    if candidates.is_empty() || top_n == 0 {
        return Vec::new();
    }

    // EV-descending visit order over the whole set; the sort is stable so
    // ties preserve input order.
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .ev
            .partial_cmp(&candidates[a].ev)
            .unwrap_or(Ordering::Equal)
    });

    let qualifying: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&i| candidates[i].ev >= min_edge)
        .collect();

    if qualifying.len() >= top_n {
        return qualifying[..top_n]
            .iter()
            .map(|&i| candidates[i].clone())
            .collect();
    }

    info!(
        qualifying = qualifying.len(),
        min_edge,
        top_n,
        "Not enough qualifiers; filling selection with low-EV fallbacks"
    );

    let mut seen: HashSet<usize> = qualifying.iter().copied().collect();
    let mut picked = qualifying;
    for i in order {
        if picked.len() >= top_n {
            break;
        }
        if seen.insert(i) {
            if candidates[i].ev < min_edge {
                candidates[i].fallback = true;
            }
            picked.push(i);
        }
    }

    // Qualifiers and fill were appended in two passes; re-sort so the
    // final list is EV-descending end to end.
    picked.sort_by(|&a, &b| {
        candidates[b]
            .ev
            .partial_cmp(&candidates[a].ev)
            .unwrap_or(Ordering::Equal)
    });

    picked.into_iter().map(|i| candidates[i].clone()).collect()
}
