//! Bankroll ledger.
//!
//! Tracks starting and current balance in exact decimal arithmetic and
//! persists the state as pretty-printed JSON so it survives restarts
//! and stays hand-editable. A corrupt or unreadable state file is
//! replaced with a fresh ledger rather than crashing the scanner.

use anyhow::{Context, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Flat stake as a fraction of the current bankroll.
const STAKE_FRACTION: Decimal = dec!(0.01);
/// Minimum edge before any stake is recommended.
const STAKE_MIN_EDGE: f64 = 0.02;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BankrollState {
    starting: Decimal,
    current: Decimal,
    bets_placed: u64,
}

/// A point-in-time view of the ledger for messages and the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BankrollSummary {
    pub starting: Decimal,
    pub current: Decimal,
    pub profit: Decimal,
    pub roi_pct: f64,
    pub bets_placed: u64,
}

pub struct Bankroll {
    state: BankrollState,
    path: PathBuf,
}

impl Bankroll {
    /// Load the ledger from `path`, or initialize it at `starting` when
    /// the file is absent or unreadable.
    pub fn load_or_init(path: impl AsRef<Path>, starting: Decimal) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BankrollState>(&contents) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt bankroll file; reinitializing");
                    BankrollState { starting, current: starting, bets_placed: 0 }
                }
            },
            Err(_) => {
                info!(path = %path.display(), %starting, "No bankroll file; starting fresh");
                BankrollState { starting, current: starting, bets_placed: 0 }
            }
        };
        let ledger = Self { state, path };
        ledger.save()?;
        Ok(ledger)
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.state)
            .context("Failed to serialize bankroll state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write bankroll file {}", self.path.display()))
    }

    pub fn current(&self) -> Decimal {
        self.state.current
    }

    /// Recommended stake for a candidate with the given EV per unit:
    /// 1% of the current bankroll, rounded to cents, but only when the
    /// edge clears the staking threshold and the ledger is solvent.
    pub fn recommend_stake(&self, ev: f64) -> Decimal {
        if ev >= STAKE_MIN_EDGE && self.state.current > Decimal::ZERO {
            (self.state.current * STAKE_FRACTION).round_dp(2)
        } else {
            Decimal::ZERO
        }
    }

    /// Apply one settled bet: `net_return` is the profit (positive) or
    /// loss (negative, usually the stake) to fold into the balance.
    pub fn record_result(&mut self, net_return: Decimal) -> Result<()> {
        self.state.current += net_return;
        self.state.bets_placed += 1;
        info!(
            net_return = %net_return,
            current = %self.state.current,
            "Bankroll updated"
        );
        self.save()
    }

    /// Overwrite the balance (used by the manual reset command).
    pub fn set_balance(&mut self, amount: Decimal) -> Result<()> {
        self.state.starting = amount;
        self.state.current = amount;
        self.state.bets_placed = 0;
        self.save()
    }

    pub fn summary(&self) -> BankrollSummary {
        let profit = self.state.current - self.state.starting;
        let roi_pct = if self.state.starting > Decimal::ZERO {
            (profit / self.state.starting * dec!(100)).to_f64().unwrap_or(0.0)
        } else {
            0.0
        };
        BankrollSummary {
            starting: self.state.starting,
            current: self.state.current,
            profit,
            roi_pct,
            bets_placed: self.state.bets_placed,
        }
    }
}
