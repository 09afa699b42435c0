//! EDGELINE scanner binary.
//!
//! Wires the pipeline together and runs the scan loop: every interval,
//! fetch odds for each configured sport, screen, score, pick, then push
//! the digest to Telegram and the dashboard. Chat commands arrive over
//! an mpsc channel from the poller and are handled between scans.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use edgeline::bankroll::Bankroll;
use edgeline::config::{resolve_env, AppConfig};
use edgeline::dashboard::{spawn_dashboard, DashboardState, ScanSnapshot};
use edgeline::engine::Evaluator;
use edgeline::provider::{OddsProvider, TheOddsApiClient};
use edgeline::results::ResultsTracker;
use edgeline::telegram::{format_pick_lines, BotCommand, TelegramClient, TelegramPoller};
use edgeline::types::Candidate;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("edgeline=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("EDGELINE_LOG_JSON").is_ok() {
        builder.json().init();
    } else {
        builder.init();
    }
}

struct App {
    config: AppConfig,
    evaluator: Evaluator,
    provider: TheOddsApiClient,
    bankroll: Bankroll,
    results: ResultsTracker,
    dashboard: DashboardState,
    telegram: Option<(TelegramClient, i64)>,
    latest_picks: Vec<Candidate>,
    last_scan: Option<ScanSnapshot>,
    cycles: u64,
    started_at: chrono::DateTime<Utc>,
}

impl App {
    async fn run_cycle(&mut self) {
        let fetches = self
            .config
            .scanner
            .sports
            .iter()
            .map(|sport| self.provider.fetch_games(sport));
        let mut games = Vec::new();
        for (sport, result) in self
            .config
            .scanner
            .sports
            .iter()
            .zip(futures::future::join_all(fetches).await)
        {
            match result {
                Ok(fetched) => games.extend(fetched),
                // One sport failing must not sink the whole cycle.
                Err(e) => warn!(sport = %sport, error = %e, "Fetch failed; skipping sport this cycle"),
            }
        }

        let fetched = games.len();
        if self.config.scanner.commence_horizon_hours > 0 {
            let horizon = Utc::now() + ChronoDuration::hours(self.config.scanner.commence_horizon_hours);
            games.retain(|g| g.commence_time <= horizon);
        }

        let screened = self.evaluator.screen(games);
        let picks = self.evaluator.top_picks(&screened);
        info!(
            fetched,
            screened = screened.len(),
            picks = picks.len(),
            "Scan cycle complete"
        );

        let snapshot = ScanSnapshot {
            at: Utc::now(),
            games_fetched: fetched,
            games_screened: screened.len(),
            picks: picks.len(),
        };
        self.cycles += 1;
        self.last_scan = Some(snapshot.clone());
        self.latest_picks = picks.clone();
        self.dashboard.record_scan(snapshot, picks.clone()).await;
        self.dashboard.record_bankroll(self.bankroll.summary()).await;

        if !picks.is_empty() {
            self.notify(&format_pick_lines(&picks)).await;
        }
    }

    async fn notify(&self, text: &str) {
        if let Some((client, chat_id)) = &self.telegram {
            if let Err(e) = client.send_message(*chat_id, text).await {
                error!(error = %e, "Failed to send Telegram message");
            }
        }
    }

    async fn handle_command(&mut self, command: BotCommand) {
        let reply = match command {
            BotCommand::Start => concat!(
                "EDGELINE scanner online.\n",
                "/picks - latest top picks\n",
                "/take N - record pick N as a bet\n",
                "/bankroll - ledger summary\n",
                "/stats - settled-bet statistics\n",
                "/status - scanner status\n",
                "/settings - engine tunables",
            )
            .to_string(),
            BotCommand::Picks => format_pick_lines(&self.latest_picks),
            BotCommand::Take(n) => self.take_pick(n),
            BotCommand::Bankroll => {
                let s = self.bankroll.summary();
                format!(
                    "Bankroll: {} (started {})\nProfit: {} | ROI: {:.2}% | Bets: {}",
                    s.current, s.starting, s.profit, s.roi_pct, s.bets_placed,
                )
            }
            BotCommand::Stats => {
                let s = self.results.summarize();
                format!(
                    "Bets: {} total, {} pending\nRecord: {}-{} ({:.1}% win rate)\nNet profit: {}",
                    s.total,
                    s.pending,
                    s.wins,
                    s.losses,
                    s.win_rate * 100.0,
                    s.net_profit,
                )
            }
            BotCommand::Status => {
                let uptime = (Utc::now() - self.started_at).num_minutes();
                match &self.last_scan {
                    Some(scan) => format!(
                        "Up {uptime} min, {} cycles.\nLast scan {}: {} fetched, {} screened, {} picks.",
                        self.cycles,
                        scan.at.format("%H:%M UTC"),
                        scan.games_fetched,
                        scan.games_screened,
                        scan.picks,
                    ),
                    None => format!("Up {uptime} min, no scans completed yet."),
                }
            }
            BotCommand::Settings => {
                let c = self.evaluator.config();
                format!(
                    "min_edge: {:.3}\ntop_n: {}\nbooks: {}\nodds band: [{:.0}, {:.0}]\nsports: {}",
                    c.min_edge,
                    c.top_n,
                    c.book_aliases.join(", "),
                    c.min_odds,
                    c.max_odds,
                    self.config.scanner.sports.join(", "),
                )
            }
        };
        self.notify(&reply).await;
    }

    /// Record pick `n` (1-based, as displayed) as a placed bet.
    fn take_pick(&mut self, n: usize) -> String {
        let Some(pick) = n.checked_sub(1).and_then(|i| self.latest_picks.get(i)).cloned() else {
            return format!("No pick #{n}. Use /picks to see the current list.");
        };
        let stake = self.bankroll.recommend_stake(pick.ev);
        match self.results.record(&pick, stake) {
            Ok(id) => format!(
                "Recorded: {} | {} @ {:+.0}\nStake: {} | Bet id: {id}",
                pick.game,
                pick.description(),
                pick.book_odds,
                stake,
            ),
            Err(e) => {
                error!(error = %e, "Failed to record bet");
                "Failed to record the bet; see logs.".to_string()
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();
    info!("EDGELINE starting");

    let config_path =
        std::env::var("EDGELINE_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = AppConfig::load(&config_path)?;

    let api_key = resolve_env(&config.provider.api_key_env)?;
    let provider = TheOddsApiClient::new(api_key)?;

    let bankroll = Bankroll::load_or_init(&config.bankroll.file, config.bankroll.starting)?;
    let results = ResultsTracker::load_or_init(&config.results.file)?;
    let evaluator = Evaluator::new(config.engine.clone().into());

    let dashboard = DashboardState::new();
    if config.dashboard.enabled {
        spawn_dashboard(dashboard.clone(), config.dashboard.port);
    }

    let (tx, mut rx) = mpsc::channel::<BotCommand>(32);
    let telegram = if config.telegram.enabled {
        let token = resolve_env(&config.telegram.bot_token_env)?;
        let chat_id: i64 = resolve_env(&config.telegram.chat_id_env)?
            .parse()
            .context("Telegram chat id must be an integer")?;
        let poller = TelegramPoller::new(TelegramClient::new(&token)?, chat_id, tx);
        tokio::spawn(poller.run());
        Some((TelegramClient::new(&token)?, chat_id))
    } else {
        info!("Telegram disabled; running scan loop only");
        None
    };

    let mut app = App {
        evaluator,
        provider,
        bankroll,
        results,
        dashboard,
        telegram,
        latest_picks: Vec::new(),
        last_scan: None,
        cycles: 0,
        started_at: Utc::now(),
        config,
    };

    let mut interval =
        tokio::time::interval(Duration::from_secs(app.config.scanner.scan_interval_secs));
    loop {
        tokio::select! {
            _ = interval.tick() => app.run_cycle().await,
            Some(command) = rx.recv() => app.handle_command(command).await,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }
    Ok(())
}
