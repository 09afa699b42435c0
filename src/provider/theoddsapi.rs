//! The Odds API client (https://the-odds-api.com).
//!
//! Fetches upcoming games with US-region bookmaker odds and converts
//! the raw JSON into the typed model at the boundary. Markets the
//! engine does not understand, outcomes without a price, and entries
//! that fail to parse are dropped here so nothing untyped escapes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::{BookmakerQuote, GameRecord, MarketKind, MarketQuote, OutcomeQuote};

use super::OddsProvider;

const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com/v4";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TheOddsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl TheOddsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent("edgeline/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, base_url, api_key })
    }

    fn odds_url(&self, sport: &str) -> String {
        format!(
            "{}/sports/{}/odds?apiKey={}&regions=us&markets=h2h,spreads,totals&oddsFormat=american&dateFormat=iso",
            self.base_url,
            urlencoding::encode(sport),
            self.api_key,
        )
    }
}

#[async_trait]
impl OddsProvider for TheOddsApiClient {
    async fn fetch_games(&self, sport: &str) -> Result<Vec<GameRecord>> {
        let response = self
            .http
            .get(self.odds_url(sport))
            .send()
            .await
            .with_context(|| format!("Odds request failed for sport {sport}"))?;

        // The API meters by request; the remaining quota rides back in a
        // response header.
        if let Some(remaining) = response
            .headers()
            .get("x-requests-remaining")
            .and_then(|v| v.to_str().ok())
        {
            debug!(sport, remaining, "Odds API quota");
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Odds API returned {status} for sport {sport}: {body}");
        }

        let raw: Vec<RawGame> = response
            .json()
            .await
            .with_context(|| format!("Failed to decode odds response for sport {sport}"))?;

        let games: Vec<GameRecord> = raw.into_iter().filter_map(convert_game).collect();
        debug!(sport, games = games.len(), "Fetched games");
        Ok(games)
    }

    fn name(&self) -> &str {
        "the-odds-api"
    }
}

// ---------------------------------------------------------------------------
// Raw wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawGame {
    id: String,
    #[serde(default)]
    sport_title: String,
    commence_time: DateTime<Utc>,
    #[serde(default)]
    home_team: String,
    #[serde(default)]
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<RawBookmaker>,
}

#[derive(Debug, Deserialize)]
struct RawBookmaker {
    #[serde(default)]
    title: String,
    last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    markets: Vec<RawMarket>,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<RawOutcome>,
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    point: Option<f64>,
}

fn convert_game(raw: RawGame) -> Option<GameRecord> {
    if raw.id.is_empty() {
        warn!("Dropping game entry without an id");
        return None;
    }

    let bookmakers = raw
        .bookmakers
        .into_iter()
        .map(|b| BookmakerQuote {
            title: b.title,
            last_update: b.last_update,
            markets: b.markets.into_iter().filter_map(convert_market).collect(),
        })
        .collect();

    Some(GameRecord {
        id: raw.id,
        sport: raw.sport_title,
        home_team: raw.home_team,
        away_team: raw.away_team,
        commence_time: raw.commence_time,
        bookmakers,
    })
}

fn convert_market(raw: RawMarket) -> Option<MarketQuote> {
    // Unknown market keys (outrights, player props) are dropped here.
    let kind: MarketKind = raw.key.parse().ok()?;
    let outcomes = raw
        .outcomes
        .into_iter()
        .map(|o| OutcomeQuote {
            name: o.name.or(o.description).unwrap_or_default(),
            // Missing prices become the 0 sentinel and get screened out.
            price: o.price.unwrap_or(0.0),
            point: o.point,
        })
        .collect();
    Some(MarketQuote { kind, outcomes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_game_value() -> serde_json::Value {
        json!({
            "id": "abc123",
            "sport_key": "basketball_nba",
            "sport_title": "NBA",
            "commence_time": "2026-03-01T23:30:00Z",
            "home_team": "Boston Celtics",
            "away_team": "New York Knicks",
            "bookmakers": [{
                "key": "bovada",
                "title": "Bovada",
                "last_update": "2026-03-01T20:00:00Z",
                "markets": [
                    {
                        "key": "h2h",
                        "outcomes": [
                            {"name": "Boston Celtics", "price": -150},
                            {"name": "New York Knicks", "price": 130}
                        ]
                    },
                    {
                        "key": "spreads",
                        "outcomes": [
                            {"name": "Boston Celtics", "price": -110, "point": -3.5},
                            {"name": "New York Knicks", "price": -110, "point": 3.5}
                        ]
                    },
                    {
                        "key": "outrights",
                        "outcomes": [{"name": "Boston Celtics", "price": 400}]
                    }
                ]
            }]
        })
    }

    #[test]
    fn test_convert_full_game() {
        let raw: RawGame = serde_json::from_value(raw_game_value()).unwrap();
        let game = convert_game(raw).unwrap();
        assert_eq!(game.id, "abc123");
        assert_eq!(game.sport, "NBA");
        assert_eq!(game.label(), "Boston Celtics vs New York Knicks");
        assert_eq!(game.bookmakers.len(), 1);

        let book = &game.bookmakers[0];
        assert_eq!(book.title, "Bovada");
        // The outrights market is unsupported and dropped.
        assert_eq!(book.markets.len(), 2);
        let h2h = book.market(MarketKind::Moneyline).unwrap();
        assert_eq!(h2h.outcomes[0].price, -150.0);
        let spread = book.market(MarketKind::Spread).unwrap();
        assert_eq!(spread.outcomes[1].point, Some(3.5));
    }

    #[test]
    fn test_missing_price_becomes_zero_sentinel() {
        let raw: RawMarket = serde_json::from_value(json!({
            "key": "h2h",
            "outcomes": [{"name": "Team A"}]
        }))
        .unwrap();
        let market = convert_market(raw).unwrap();
        assert_eq!(market.outcomes[0].price, 0.0);
    }

    #[test]
    fn test_description_used_when_name_absent() {
        let raw: RawMarket = serde_json::from_value(json!({
            "key": "totals",
            "outcomes": [{"description": "Over", "price": -105, "point": 215.5}]
        }))
        .unwrap();
        let market = convert_market(raw).unwrap();
        assert_eq!(market.outcomes[0].name, "Over");
    }

    #[test]
    fn test_unknown_market_key_dropped() {
        let raw: RawMarket = serde_json::from_value(json!({
            "key": "player_points",
            "outcomes": []
        }))
        .unwrap();
        assert!(convert_market(raw).is_none());
    }

    #[test]
    fn test_game_without_id_dropped() {
        let mut value = raw_game_value();
        value["id"] = json!("");
        let raw: RawGame = serde_json::from_value(value).unwrap();
        assert!(convert_game(raw).is_none());
    }

    #[test]
    fn test_empty_bookmaker_list_tolerated() {
        let mut value = raw_game_value();
        value["bookmakers"] = json!([]);
        let raw: RawGame = serde_json::from_value(value).unwrap();
        let game = convert_game(raw).unwrap();
        assert!(game.bookmakers.is_empty());
    }

    #[test]
    fn test_odds_url_encodes_sport_key() {
        let client =
            TheOddsApiClient::with_base_url("k".to_string(), "http://localhost".to_string())
                .unwrap();
        let url = client.odds_url("basketball_nba");
        assert!(url.starts_with("http://localhost/sports/basketball_nba/odds?apiKey=k"));
        assert!(url.contains("markets=h2h,spreads,totals"));
        assert!(url.contains("oddsFormat=american"));
    }
}
