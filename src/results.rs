//! Bet history and settlement tracking.
//!
//! Every taken pick becomes a `BetRecord` persisted to a JSON file.
//! Settlements flip the status and record the realized profit; the
//! aggregate summary feeds the /stats command and the dashboard.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::{Candidate, EdgelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    pub id: Uuid,
    pub game: String,
    pub market: String,
    pub outcome: String,
    pub book_odds: f64,
    pub fair_odds: f64,
    pub ev: f64,
    pub stake: Decimal,
    pub status: BetStatus,
    /// Realized profit after settlement; zero while pending.
    pub profit: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl BetRecord {
    pub fn from_candidate(candidate: &Candidate, stake: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            game: candidate.game.clone(),
            market: candidate.market.to_string(),
            outcome: candidate.outcome.clone(),
            book_odds: candidate.book_odds,
            fair_odds: candidate.fair_odds,
            ev: candidate.ev,
            stake,
            status: BetStatus::Pending,
            profit: Decimal::ZERO,
            recorded_at: Utc::now(),
        }
    }
}

/// Aggregate view over all settled bets.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsSummary {
    pub total: usize,
    pub pending: usize,
    pub wins: usize,
    pub losses: usize,
    /// Wins over settled bets; 0 when nothing has settled yet.
    pub win_rate: f64,
    pub net_profit: Decimal,
}

pub struct ResultsTracker {
    bets: Vec<BetRecord>,
    path: PathBuf,
}

impl ResultsTracker {
    /// Load the history from `path`, or start empty when the file is
    /// absent or unreadable.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bets = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<BetRecord>>(&contents) {
                Ok(bets) => bets,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt results file; starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Ok(Self { bets, path })
    }

    fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.bets).context("Failed to serialize bet history")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write results file {}", self.path.display()))
    }

    /// Record a freshly taken pick. Returns the new record's id for
    /// later settlement.
    pub fn record(&mut self, candidate: &Candidate, stake: Decimal) -> Result<Uuid> {
        let record = BetRecord::from_candidate(candidate, stake);
        let id = record.id;
        info!(%id, game = %record.game, stake = %stake, "Bet recorded");
        self.bets.push(record);
        self.save()?;
        Ok(id)
    }

    /// Settle a pending bet. `profit` is the realized net return.
    pub fn mark_settlement(&mut self, id: Uuid, status: BetStatus, profit: Decimal) -> Result<()> {
        let bet = self
            .bets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| EdgelineError::Storage(format!("No bet with id {id}")))?;
        if bet.status != BetStatus::Pending {
            return Err(EdgelineError::Storage(format!("Bet {id} is already settled")).into());
        }
        bet.status = status;
        bet.profit = profit;
        self.save()
    }

    pub fn bets(&self) -> &[BetRecord] {
        &self.bets
    }

    pub fn pending(&self) -> impl Iterator<Item = &BetRecord> {
        self.bets.iter().filter(|b| b.status == BetStatus::Pending)
    }

    pub fn summarize(&self) -> ResultsSummary {
        let wins = self.bets.iter().filter(|b| b.status == BetStatus::Won).count();
        let losses = self.bets.iter().filter(|b| b.status == BetStatus::Lost).count();
        let pending = self.bets.len() - wins - losses;
        let settled = wins + losses;
        let win_rate = if settled > 0 { wins as f64 / settled as f64 } else { 0.0 };
        let net_profit = self.bets.iter().map(|b| b.profit).sum();
        ResultsSummary {
            total: self.bets.len(),
            pending,
            wins,
            losses,
            win_rate,
            net_profit,
        }
    }
}
