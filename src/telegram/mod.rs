//! Telegram bot integration.
//!
//! A thin client over the Bot API plus a long-poll loop that turns
//! authorized chat messages into `BotCommand`s on an mpsc channel. The
//! scan loop owns all state; this module only transports messages.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(45);
const POLL_TIMEOUT_SECS: u32 = 30;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Chat commands the scanner responds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// "/start": greeting and command list.
    Start,
    /// "/picks": current top picks from the latest scan.
    Picks,
    /// "/take N": record pick N from the latest scan as a bet.
    Take(usize),
    /// "/bankroll": ledger summary.
    Bankroll,
    /// "/stats": settled-bet statistics.
    Stats,
    /// "/status": scanner uptime and cycle counters.
    Status,
    /// "/settings": active engine tunables.
    Settings,
}

/// Parse a chat message into a command. Unknown text yields `None` and
/// is ignored rather than answered.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let mut parts = text.trim().split_whitespace();
    let head = parts.next()?;
    // Commands in groups arrive suffixed with the bot name.
    let head = head.split('@').next().unwrap_or(head);
    match head {
        "/start" => Some(BotCommand::Start),
        "/picks" => Some(BotCommand::Picks),
        "/take" => parts.next()?.parse().ok().map(BotCommand::Take),
        "/bankroll" => Some(BotCommand::Bankroll),
        "/stats" => Some(BotCommand::Stats),
        "/status" => Some(BotCommand::Status),
        "/settings" => Some(BotCommand::Settings),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    text: Option<String>,
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self { http, base_url: format!("https://api.telegram.org/bot{bot_token}") })
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response: ApiResponse<serde_json::Value> = self
            .http
            .post(format!("{}/sendMessage", self.base_url))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            .context("sendMessage request failed")?
            .json()
            .await
            .context("sendMessage response was not JSON")?;
        if !response.ok {
            anyhow::bail!(
                "sendMessage rejected: {}",
                response.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        Ok(())
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let url = format!(
            "{}/getUpdates?offset={offset}&timeout={POLL_TIMEOUT_SECS}",
            self.base_url
        );
        let response: ApiResponse<Vec<Update>> = self
            .http
            .get(url)
            .send()
            .await
            .context("getUpdates request failed")?
            .json()
            .await
            .context("getUpdates response was not JSON")?;
        if !response.ok {
            anyhow::bail!(
                "getUpdates rejected: {}",
                response.description.unwrap_or_else(|| "no description".to_string())
            );
        }
        Ok(response.result.unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Long-polls for updates and forwards commands from the authorized
/// chat. Messages from any other chat are dropped with a warning.
pub struct TelegramPoller {
    client: TelegramClient,
    authorized_chat_id: i64,
    tx: mpsc::Sender<BotCommand>,
}

impl TelegramPoller {
    pub fn new(
        client: TelegramClient,
        authorized_chat_id: i64,
        tx: mpsc::Sender<BotCommand>,
    ) -> Self {
        Self { client, authorized_chat_id, tx }
    }

    pub async fn run(self) {
        info!(chat_id = self.authorized_chat_id, "Telegram poller started");
        let mut offset: i64 = 0;
        loop {
            let updates = match self.client.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    error!(error = %e, "Telegram poll failed; backing off");
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(message) = update.message else { continue };
                let Some(text) = message.text else { continue };

                if message.chat.id != self.authorized_chat_id {
                    warn!(chat_id = message.chat.id, "Ignoring message from unauthorized chat");
                    continue;
                }
                let Some(command) = parse_command(&text) else {
                    debug!(%text, "Ignoring non-command message");
                    continue;
                };
                if self.tx.send(command).await.is_err() {
                    info!("Command channel closed; poller exiting");
                    return;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Message formatting
// ---------------------------------------------------------------------------

/// Render the pick digest sent after each scan and by /picks.
pub fn format_pick_lines(picks: &[crate::types::Candidate]) -> String {
    if picks.is_empty() {
        return "No picks this scan.".to_string();
    }
    let mut lines = Vec::with_capacity(picks.len() + 1);
    lines.push(format!("Top {} picks:", picks.len()));
    for (i, pick) in picks.iter().enumerate() {
        let flag = if pick.fallback { "⚠️ " } else { "" };
        let suffix = if pick.fallback { " (low-EV fallback)" } else { "" };
        lines.push(format!(
            "{}. {flag}{} | {}\n   Book: {:+.0} | Fair: {:+.1} | EV: {:.2}%{suffix}",
            i + 1,
            pick.game,
            pick.description(),
            pick.book_odds,
            pick.fair_odds,
            pick.edge_pct(),
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Candidate, MarketKind};

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(parse_command("/start"), Some(BotCommand::Start));
        assert_eq!(parse_command("/picks"), Some(BotCommand::Picks));
        assert_eq!(parse_command("/bankroll"), Some(BotCommand::Bankroll));
        assert_eq!(parse_command("/stats"), Some(BotCommand::Stats));
        assert_eq!(parse_command("/status"), Some(BotCommand::Status));
        assert_eq!(parse_command("/settings"), Some(BotCommand::Settings));
    }

    #[test]
    fn test_parse_take_with_index() {
        assert_eq!(parse_command("/take 2"), Some(BotCommand::Take(2)));
        assert_eq!(parse_command("/take"), None);
        assert_eq!(parse_command("/take two"), None);
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_bot_suffix() {
        assert_eq!(parse_command("  /picks  "), Some(BotCommand::Picks));
        assert_eq!(parse_command("/stats@edgeline_bot"), Some(BotCommand::Stats));
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command(""), None);
    }

    fn pick(fallback: bool) -> Candidate {
        Candidate {
            game: "Celtics vs Knicks".to_string(),
            market: MarketKind::Moneyline,
            outcome: "Knicks".to_string(),
            book_odds: 150.0,
            fair_odds: 132.5,
            ev: 0.034,
            fallback,
        }
    }

    #[test]
    fn test_format_empty_picks() {
        assert_eq!(format_pick_lines(&[]), "No picks this scan.");
    }

    #[test]
    fn test_format_pick_digest() {
        let text = format_pick_lines(&[pick(false)]);
        assert!(text.contains("Top 1 picks:"));
        assert!(text.contains("Celtics vs Knicks"));
        assert!(text.contains("Book: +150"));
        assert!(text.contains("Fair: +132.5"));
        assert!(text.contains("EV: 3.40%"));
        assert!(!text.contains("fallback"));
    }

    #[test]
    fn test_format_flags_fallback_picks() {
        let text = format_pick_lines(&[pick(true)]);
        assert!(text.contains("⚠️"));
        assert!(text.contains("(low-EV fallback)"));
    }
}
