//! Odds providers.
//!
//! A provider turns a sport key into typed `GameRecord`s. The trait seam
//! exists so the scan loop and tests can run against a mock without any
//! network; the only production implementation talks to The Odds API.

pub mod theoddsapi;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::GameRecord;

pub use theoddsapi::TheOddsApiClient;

/// Anything that can deliver upcoming games with bookmaker odds.
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Fetch upcoming games for one sport key (e.g.
    /// "basketball_nba"). Implementations return typed records only;
    /// unparseable entries are dropped at the boundary, not surfaced.
    async fn fetch_games(&self, sport: &str) -> Result<Vec<GameRecord>>;

    /// Provider name for logs and error context.
    fn name(&self) -> &str;
}
