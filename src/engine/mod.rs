//! The evaluation pipeline: screen, estimate, score, select.
//!
//! `Evaluator` ties the pure components together. One call per scan
//! cycle: fetched games go in, at most `top_n` scored candidates come
//! out. Each stage is independently testable and the evaluator itself
//! holds no mutable state between cycles.

pub mod ev;
pub mod fair_line;
pub mod filter;
pub mod selector;

use tracing::debug;

use crate::types::{Candidate, GameRecord, MarketKind};

use filter::{FilterConfig, QualityFilter};

/// Engine tunables, assembled from the config file.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum EV per unit stake for a candidate to qualify.
    pub min_edge: f64,
    /// Maximum number of candidates returned per cycle.
    pub top_n: usize,
    /// Lowercase substrings identifying the target bookmaker.
    pub book_aliases: Vec<String>,
    /// Inclusive American-odds guard band for the quality screen.
    pub min_odds: f64,
    pub max_odds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_edge: 0.02,
            top_n: 3,
            book_aliases: vec!["bovada".to_string(), "bodog".to_string()],
            min_odds: -500.0,
            max_odds: 500.0,
        }
    }
}

pub struct Evaluator {
    config: EngineConfig,
    filter: QualityFilter,
}

impl Evaluator {
    pub fn new(config: EngineConfig) -> Self {
        let filter = QualityFilter::new(FilterConfig {
            book_aliases: config.book_aliases.clone(),
            min_odds: config.min_odds,
            max_odds: config.max_odds,
        });
        Self { config, filter }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the quality screen over freshly fetched games.
    pub fn screen(&self, games: Vec<GameRecord>) -> Vec<GameRecord> {
        self.filter.screen(games)
    }

    /// Score every target-book outcome of every game and return the top
    /// picks. Input is expected to be pre-screened; unscoreable entries
    /// are skipped rather than treated as errors.
    pub fn top_picks(&self, games: &[GameRecord]) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for game in games {
            let line = fair_line::estimate(game);
            if line.is_empty() {
                debug!(game = %game.label(), "No fair line could be derived; skipping");
                continue;
            }

            for book in &game.bookmakers {
                if !self.filter.matches_book(&book.title) {
                    continue;
                }
                for market in &book.markets {
                    for outcome in &market.outcomes {
                        if outcome.price == 0.0 || !outcome.price.is_finite() {
                            continue;
                        }
                        let fair_odds = match market.kind {
                            MarketKind::Moneyline => {
                                match line.moneyline.get(&outcome.name) {
                                    Some(fair) => fair.fair_odds,
                                    None => continue,
                                }
                            }
                            kind => match line.price_for(kind) {
                                Some(price) => price,
                                None => continue,
                            },
                        };
                        let ev = ev::compute_ev(outcome.price, fair_odds);
                        candidates.push(Candidate {
                            game: game.label(),
                            market: market.kind,
                            outcome: outcome.name.clone(),
                            book_odds: outcome.price,
                            fair_odds,
                            ev,
                            fallback: false,
                        });
                    }
                }
            }
        }

        debug!(candidates = candidates.len(), "Scoring pass complete");
        selector::select_top(candidates, self.config.min_edge, self.config.top_n)
    }
}
