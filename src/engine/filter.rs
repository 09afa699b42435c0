//! Pre-evaluation quality screening.
//!
//! Raw provider responses include games the engine cannot score: missing
//! team names, zero-price placeholder outcomes, longshot prices outside
//! the guard band, or no quotes at all from the target bookmaker. The
//! filter removes those before the estimator runs, so downstream code
//! can assume every surviving record is scoreable.

use tracing::debug;

use crate::types::GameRecord;

/// Tunables for the quality screen.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Lowercase substrings that identify the target bookmaker (the
    /// provider reports regional titles like "Bovada" or "Bodog").
    pub book_aliases: Vec<String>,
    /// Inclusive American-odds guard band. Prices outside it are treated
    /// as longshot noise and disqualify the whole game.
    pub min_odds: f64,
    pub max_odds: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            book_aliases: vec!["bovada".to_string(), "bodog".to_string()],
            min_odds: -500.0,
            max_odds: 500.0,
        }
    }
}

/// Screens fetched games down to the scoreable subset.
#[derive(Debug, Clone, Default)]
pub struct QualityFilter {
    config: FilterConfig,
}

impl QualityFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// True when a bookmaker title matches one of the target aliases.
    pub fn matches_book(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.config.book_aliases.iter().any(|alias| title.contains(alias.as_str()))
    }

    /// Keep only the games that pass the quality screen, with their
    /// zero-price outcomes and empty markets already removed.
    pub fn screen(&self, games: Vec<GameRecord>) -> Vec<GameRecord> {
        let before = games.len();
        let screened: Vec<GameRecord> = games
            .into_iter()
            .filter_map(|g| self.sanitize(g))
            .collect();
        debug!(before, after = screened.len(), "Quality screen complete");
        screened
    }

    /// One game through the screen. Returns the cleaned record, or
    /// `None` when the game must be rejected outright.
    fn sanitize(&self, mut game: GameRecord) -> Option<GameRecord> {
        if game.home_team.trim().is_empty() || game.away_team.trim().is_empty() {
            debug!(game_id = %game.id, "Rejecting game with missing team names");
            return None;
        }

        let mut found_target = false;
        for book in &mut game.bookmakers {
            if !self.matches_book(&book.title) {
                continue;
            }
            found_target = true;

            for market in &mut book.markets {
                market.outcomes.retain(|o| o.price != 0.0 && o.price.is_finite());
            }
            book.markets.retain(|m| !m.outcomes.is_empty());

            // A single out-of-band price disqualifies the game: guard-band
            // violations usually mean the whole quote sheet is stale or
            // the matchup is a mismatch not worth modeling.
            for market in &book.markets {
                for outcome in &market.outcomes {
                    if outcome.price < self.config.min_odds || outcome.price > self.config.max_odds
                    {
                        debug!(
                            game_id = %game.id,
                            price = outcome.price,
                            "Rejecting game with out-of-band price"
                        );
                        return None;
                    }
                }
            }

            if book.markets.is_empty() {
                debug!(game_id = %game.id, "Rejecting game with no usable target-book markets");
                return None;
            }
        }

        if !found_target {
            debug!(game_id = %game.id, "Rejecting game without the target bookmaker");
            return None;
        }
        Some(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookmakerQuote, MarketKind, MarketQuote, OutcomeQuote};
    use chrono::Utc;

    fn outcome(name: &str, price: f64) -> OutcomeQuote {
        OutcomeQuote { name: name.to_string(), price, point: None }
    }

    fn game_with_book(title: &str, prices: &[(&str, f64)]) -> GameRecord {
        GameRecord {
            id: "g1".to_string(),
            sport: "NBA".to_string(),
            home_team: "Home".to_string(),
            away_team: "Away".to_string(),
            commence_time: Utc::now(),
            bookmakers: vec![BookmakerQuote {
                title: title.to_string(),
                last_update: None,
                markets: vec![MarketQuote {
                    kind: MarketKind::Moneyline,
                    outcomes: prices.iter().map(|(n, p)| outcome(n, *p)).collect(),
                }],
            }],
        }
    }

    #[test]
    fn test_matches_book_by_substring() {
        let filter = QualityFilter::default();
        assert!(filter.matches_book("Bovada"));
        assert!(filter.matches_book("Bodog (CA)"));
        assert!(filter.matches_book("BOVADA.lv"));
        assert!(!filter.matches_book("DraftKings"));
    }

    #[test]
    fn test_clean_game_passes() {
        let filter = QualityFilter::default();
        let games = vec![game_with_book("Bovada", &[("Home", -150.0), ("Away", 130.0)])];
        assert_eq!(filter.screen(games).len(), 1);
    }

    #[test]
    fn test_missing_team_name_rejected() {
        let filter = QualityFilter::default();
        let mut game = game_with_book("Bovada", &[("Home", -150.0), ("Away", 130.0)]);
        game.away_team = "  ".to_string();
        assert!(filter.screen(vec![game]).is_empty());
    }

    #[test]
    fn test_no_target_book_rejected() {
        let filter = QualityFilter::default();
        let games = vec![game_with_book("DraftKings", &[("Home", -150.0), ("Away", 130.0)])];
        assert!(filter.screen(games).is_empty());
    }

    #[test]
    fn test_out_of_band_price_rejects_whole_game() {
        let filter = QualityFilter::default();
        let games = vec![game_with_book("Bovada", &[("Home", -900.0), ("Away", 550.0)])];
        assert!(filter.screen(games).is_empty());
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let filter = QualityFilter::default();
        let games = vec![game_with_book("Bovada", &[("Home", -500.0), ("Away", 500.0)])];
        assert_eq!(filter.screen(games).len(), 1);
    }

    #[test]
    fn test_zero_price_outcomes_stripped_not_fatal() {
        let filter = QualityFilter::default();
        let games = vec![game_with_book("Bovada", &[("Home", -150.0), ("Away", 0.0)])];
        let screened = filter.screen(games);
        assert_eq!(screened.len(), 1);
        let outcomes = &screened[0].bookmakers[0].markets[0].outcomes;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, "Home");
    }

    #[test]
    fn test_all_zero_prices_rejects_game() {
        let filter = QualityFilter::default();
        let games = vec![game_with_book("Bovada", &[("Home", 0.0), ("Away", 0.0)])];
        assert!(filter.screen(games).is_empty());
    }

    #[test]
    fn test_other_books_left_untouched() {
        let filter = QualityFilter::default();
        let mut game = game_with_book("Bovada", &[("Home", -150.0), ("Away", 130.0)]);
        // A rival book quoting a longshot must not disqualify the game.
        game.bookmakers.push(BookmakerQuote {
            title: "DraftKings".to_string(),
            last_update: None,
            markets: vec![MarketQuote {
                kind: MarketKind::Moneyline,
                outcomes: vec![outcome("Home", -2000.0), outcome("Away", 950.0)],
            }],
        });
        let screened = filter.screen(vec![game]);
        assert_eq!(screened.len(), 1);
        assert_eq!(screened[0].bookmakers.len(), 2);
    }

    #[test]
    fn test_custom_aliases() {
        let filter = QualityFilter::new(FilterConfig {
            book_aliases: vec!["fanduel".to_string()],
            ..FilterConfig::default()
        });
        assert!(filter.matches_book("FanDuel Sportsbook"));
        assert!(!filter.matches_book("Bovada"));
    }
}
