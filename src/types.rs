//! Shared types for the EDGELINE scanner.
//!
//! These types form the data model used across all modules. Raw provider
//! JSON is converted into this model once, at the ingestion boundary, so
//! the estimator and selector never see untyped maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Market kinds
// ---------------------------------------------------------------------------

/// The market types the engine understands. The Odds API calls these
/// `h2h`, `spreads`, and `totals`; anything else is dropped at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketKind {
    Moneyline,
    Spread,
    Total,
}

impl MarketKind {
    /// All supported kinds (useful for iteration).
    pub const ALL: &'static [MarketKind] =
        &[MarketKind::Moneyline, MarketKind::Spread, MarketKind::Total];
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketKind::Moneyline => write!(f, "moneyline"),
            MarketKind::Spread => write!(f, "spread"),
            MarketKind::Total => write!(f, "total"),
        }
    }
}

/// Parse a provider market key (case-insensitive).
impl std::str::FromStr for MarketKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h2h" | "moneyline" => Ok(MarketKind::Moneyline),
            "spreads" | "spread" => Ok(MarketKind::Spread),
            "totals" | "total" => Ok(MarketKind::Total),
            _ => Err(anyhow::anyhow!("Unsupported market key: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Game records
// ---------------------------------------------------------------------------

/// One quoted outcome inside a market: a label (team name, or
/// "Over"/"Under"), an American-odds price, and an optional line value
/// (point spread or total number).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeQuote {
    pub name: String,
    /// American odds. |price| >= 100 by convention; 0 marks missing data
    /// and is discarded before any math.
    pub price: f64,
    pub point: Option<f64>,
}

/// All outcomes a single bookmaker quotes for one market type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    pub kind: MarketKind,
    pub outcomes: Vec<OutcomeQuote>,
}

/// One bookmaker's full quote sheet for a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmakerQuote {
    pub title: String,
    pub last_update: Option<DateTime<Utc>>,
    pub markets: Vec<MarketQuote>,
}

impl BookmakerQuote {
    /// The quote for a given market kind, if this bookmaker offers it.
    pub fn market(&self, kind: MarketKind) -> Option<&MarketQuote> {
        self.markets.iter().find(|m| m.kind == kind)
    }
}

/// One game and every bookmaker's odds for it. Immutable once fetched;
/// lives for a single evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: DateTime<Utc>,
    pub bookmakers: Vec<BookmakerQuote>,
}

impl GameRecord {
    /// Human-readable game label, e.g. "Celtics vs Knicks".
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({} books, starts {})",
            self.sport,
            self.label(),
            self.bookmakers.len(),
            self.commence_time.format("%Y-%m-%d %H:%M UTC"),
        )
    }
}

// ---------------------------------------------------------------------------
// Fair lines
// ---------------------------------------------------------------------------

/// Consensus estimate for one moneyline outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairOutcome {
    /// De-vigged probability, strictly inside (0, 1).
    pub fair_prob: f64,
    /// The probability expressed back as American odds.
    pub fair_odds: f64,
}

/// Consensus lines for one game, derived fresh per evaluation pass and
/// never persisted. A market with no qualifying bookmaker data is simply
/// absent (empty map / `None`); no placeholder entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FairLine {
    /// Per-outcome fair probabilities for the moneyline market.
    pub moneyline: BTreeMap<String, FairOutcome>,
    /// Price-averaged fair odds for the spread market (no de-vig).
    pub spread: Option<f64>,
    /// Price-averaged fair odds for the totals market (no de-vig).
    pub total: Option<f64>,
}

impl FairLine {
    pub fn is_empty(&self) -> bool {
        self.moneyline.is_empty() && self.spread.is_none() && self.total.is_none()
    }

    /// Market-level fair price for spread/total markets. Moneyline fair
    /// prices are per-outcome; use the `moneyline` map for those.
    pub fn price_for(&self, kind: MarketKind) -> Option<f64> {
        match kind {
            MarketKind::Spread => self.spread,
            MarketKind::Total => self.total,
            MarketKind::Moneyline => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// One scored (game, market, outcome) opportunity at the target
/// bookmaker. Produced per evaluation pass, consumed by the selector,
/// then handed to the messaging/recording collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub game: String,
    pub market: MarketKind,
    pub outcome: String,
    /// The target bookmaker's quoted American odds.
    pub book_odds: f64,
    /// The consensus fair American odds this was scored against.
    pub fair_odds: f64,
    /// Expected profit per unit stake.
    pub ev: f64,
    /// True when this entry was included only to fill the requested
    /// quota despite falling below the minimum-edge threshold.
    pub fallback: bool,
}

impl Candidate {
    /// EV expressed as a percentage edge.
    pub fn edge_pct(&self) -> f64 {
        self.ev * 100.0
    }

    /// Short description for messages and logs.
    pub fn description(&self) -> String {
        format!("{} | {}", self.market, self.outcome)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | book={:+.0} fair={:+.1} EV={:.2}%{}",
            self.game,
            self.description(),
            self.book_odds,
            self.fair_odds,
            self.edge_pct(),
            if self.fallback { " (fallback)" } else { "" },
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for EDGELINE.
#[derive(Debug, thiserror::Error)]
pub enum EdgelineError {
    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Telegram error: {0}")]
    Telegram(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_game() -> GameRecord {
        GameRecord {
            id: "g1".to_string(),
            sport: "NBA".to_string(),
            home_team: "Celtics".to_string(),
            away_team: "Knicks".to_string(),
            commence_time: Utc.with_ymd_and_hms(2026, 3, 1, 23, 30, 0).unwrap(),
            bookmakers: vec![BookmakerQuote {
                title: "Bovada".to_string(),
                last_update: None,
                markets: vec![MarketQuote {
                    kind: MarketKind::Moneyline,
                    outcomes: vec![
                        OutcomeQuote { name: "Celtics".into(), price: -150.0, point: None },
                        OutcomeQuote { name: "Knicks".into(), price: 130.0, point: None },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn test_market_kind_display() {
        assert_eq!(format!("{}", MarketKind::Moneyline), "moneyline");
        assert_eq!(format!("{}", MarketKind::Spread), "spread");
        assert_eq!(format!("{}", MarketKind::Total), "total");
    }

    #[test]
    fn test_market_kind_from_provider_keys() {
        assert_eq!("h2h".parse::<MarketKind>().unwrap(), MarketKind::Moneyline);
        assert_eq!("spreads".parse::<MarketKind>().unwrap(), MarketKind::Spread);
        assert_eq!("TOTALS".parse::<MarketKind>().unwrap(), MarketKind::Total);
        assert!("outrights".parse::<MarketKind>().is_err());
    }

    #[test]
    fn test_market_kind_serialization_roundtrip() {
        for kind in MarketKind::ALL {
            let json = serde_json::to_string(kind).unwrap();
            let parsed: MarketKind = serde_json::from_str(&json).unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_game_label() {
        assert_eq!(sample_game().label(), "Celtics vs Knicks");
    }

    #[test]
    fn test_game_display() {
        let display = format!("{}", sample_game());
        assert!(display.contains("NBA"));
        assert!(display.contains("Celtics vs Knicks"));
    }

    #[test]
    fn test_bookmaker_market_lookup() {
        let game = sample_game();
        let book = &game.bookmakers[0];
        assert!(book.market(MarketKind::Moneyline).is_some());
        assert!(book.market(MarketKind::Spread).is_none());
    }

    #[test]
    fn test_game_serialization_roundtrip() {
        let game = sample_game();
        let json = serde_json::to_string(&game).unwrap();
        let parsed: GameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, "g1");
        assert_eq!(parsed.bookmakers[0].markets[0].kind, MarketKind::Moneyline);
        assert_eq!(parsed.bookmakers[0].markets[0].outcomes[1].price, 130.0);
    }

    #[test]
    fn test_fair_line_empty() {
        let line = FairLine::default();
        assert!(line.is_empty());
        assert!(line.price_for(MarketKind::Spread).is_none());
        assert!(line.price_for(MarketKind::Moneyline).is_none());
    }

    #[test]
    fn test_fair_line_price_for() {
        let line = FairLine { spread: Some(-108.5), total: None, ..Default::default() };
        assert!(!line.is_empty());
        assert_eq!(line.price_for(MarketKind::Spread), Some(-108.5));
        assert_eq!(line.price_for(MarketKind::Total), None);
    }

    #[test]
    fn test_candidate_edge_pct_and_description() {
        let c = Candidate {
            game: "Celtics vs Knicks".into(),
            market: MarketKind::Moneyline,
            outcome: "Knicks".into(),
            book_odds: 150.0,
            fair_odds: 120.0,
            ev: 0.1364,
            fallback: false,
        };
        assert!((c.edge_pct() - 13.64).abs() < 1e-10);
        assert_eq!(c.description(), "moneyline | Knicks");
    }

    #[test]
    fn test_candidate_display_flags_fallback() {
        let c = Candidate {
            game: "A vs B".into(),
            market: MarketKind::Total,
            outcome: "Over".into(),
            book_odds: -105.0,
            fair_odds: -110.0,
            ev: 0.011,
            fallback: true,
        };
        assert!(format!("{c}").contains("(fallback)"));
    }

    #[test]
    fn test_error_display() {
        let e = EdgelineError::Provider {
            provider: "the-odds-api".to_string(),
            message: "status 401".to_string(),
        };
        assert_eq!(format!("{e}"), "Provider error (the-odds-api): status 401");
    }
}
