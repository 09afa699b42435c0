//! Configuration loading.
//!
//! Tunables live in a TOML file. Secrets never do: the file names the
//! environment variables that hold them, and resolution fails fast at
//! startup when a required variable is absent so a misconfigured
//! deployment dies loudly instead of scanning with dead credentials.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;

use crate::engine::EngineConfig;
use crate::types::EdgelineError;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub engine: EngineSection,
    pub provider: ProviderConfig,
    #[serde(default)]
    pub bankroll: BankrollConfig,
    #[serde(default)]
    pub results: ResultsConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Sport keys passed to the provider each cycle.
    pub sports: Vec<String>,
    pub scan_interval_secs: u64,
    /// Only consider games starting within this many hours; 0 disables
    /// the horizon.
    pub commence_horizon_hours: i64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            sports: vec![
                "basketball_nba".to_string(),
                "americanfootball_nfl".to_string(),
                "icehockey_nhl".to_string(),
                "baseball_mlb".to_string(),
            ],
            scan_interval_secs: 1800,
            commence_horizon_hours: 48,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub min_edge: f64,
    pub top_n: usize,
    pub book_aliases: Vec<String>,
    pub min_odds: f64,
    pub max_odds: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        let d = EngineConfig::default();
        Self {
            min_edge: d.min_edge,
            top_n: d.top_n,
            book_aliases: d.book_aliases,
            min_odds: d.min_odds,
            max_odds: d.max_odds,
        }
    }
}

impl From<EngineSection> for EngineConfig {
    fn from(s: EngineSection) -> Self {
        EngineConfig {
            min_edge: s.min_edge,
            top_n: s.top_n,
            book_aliases: s.book_aliases,
            min_odds: s.min_odds,
            max_odds: s.max_odds,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Name of the environment variable holding The Odds API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_key_env() -> String {
    "ODDS_API_KEY".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BankrollConfig {
    pub file: String,
    pub starting: Decimal,
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self { file: "bankroll.json".to_string(), starting: dec!(1000) }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    pub file: String,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self { file: "results.json".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    /// Environment variable holding the bot token.
    pub bot_token_env: String,
    /// Environment variable holding the authorized chat id.
    pub chat_id_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { enabled: true, port: 8080 }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

/// Resolve a secret by the environment-variable name the config gave.
/// There are deliberately no fallback values.
pub fn resolve_env(var: &str) -> Result<String> {
    std::env::var(var)
        .map_err(|_| EdgelineError::Config(format!("Required environment variable {var} is not set")).into())
        .and_then(|v| {
            if v.trim().is_empty() {
                Err(EdgelineError::Config(format!("Environment variable {var} is empty")).into())
            } else {
                Ok(v)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [provider]
            api_key_env = "ODDS_API_KEY"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.min_edge, 0.02);
        assert_eq!(config.engine.top_n, 3);
        assert_eq!(config.engine.book_aliases, vec!["bovada", "bodog"]);
        assert_eq!(config.scanner.scan_interval_secs, 1800);
        assert_eq!(config.bankroll.file, "bankroll.json");
        assert!(!config.telegram.enabled);
        assert_eq!(config.dashboard.port, 8080);
    }

    #[test]
    fn test_full_config_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [scanner]
            sports = ["basketball_nba"]
            scan_interval_secs = 600
            commence_horizon_hours = 24

            [engine]
            min_edge = 0.05
            top_n = 5
            book_aliases = ["fanduel"]
            min_odds = -300.0
            max_odds = 300.0

            [provider]
            api_key_env = "MY_KEY"

            [bankroll]
            file = "/data/bankroll.json"
            starting = 2500.0

            [telegram]
            enabled = true
            bot_token_env = "BOT_TOKEN"
            chat_id_env = "CHAT_ID"

            [dashboard]
            enabled = false
            port = 9999
            "#,
        )
        .unwrap();
        assert_eq!(config.scanner.sports, vec!["basketball_nba"]);
        assert_eq!(config.engine.min_edge, 0.05);
        assert_eq!(config.engine.book_aliases, vec!["fanduel"]);
        assert_eq!(config.provider.api_key_env, "MY_KEY");
        assert_eq!(config.bankroll.starting, dec!(2500));
        assert!(config.telegram.enabled);
        assert!(!config.dashboard.enabled);
    }

    #[test]
    fn test_engine_section_converts() {
        let section = EngineSection { min_edge: 0.03, top_n: 7, ..Default::default() };
        let engine: EngineConfig = section.into();
        assert_eq!(engine.min_edge, 0.03);
        assert_eq!(engine.top_n, 7);
    }

    #[test]
    fn test_resolve_env_missing_fails() {
        assert!(resolve_env("EDGELINE_TEST_DEFINITELY_UNSET_VAR").is_err());
    }

    #[test]
    fn test_resolve_env_reads_value() {
        std::env::set_var("EDGELINE_TEST_RESOLVE_VAR", "sekrit");
        assert_eq!(resolve_env("EDGELINE_TEST_RESOLVE_VAR").unwrap(), "sekrit");
        std::env::remove_var("EDGELINE_TEST_RESOLVE_VAR");
    }

    #[test]
    fn test_resolve_env_rejects_empty_value() {
        std::env::set_var("EDGELINE_TEST_EMPTY_VAR", "  ");
        assert!(resolve_env("EDGELINE_TEST_EMPTY_VAR").is_err());
        std::env::remove_var("EDGELINE_TEST_EMPTY_VAR");
    }
}
