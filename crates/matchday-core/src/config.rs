use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{MatchdayError, Result};

/// Default lead times, in hours before kickoff, largest first.
pub const DEFAULT_LEAD_HOURS: [u32; 3] = [7, 5, 2];
/// Cadence of the webhook registration health check.
pub const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 60;

/// Top-level config (matchday.toml + MATCHDAY_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchdayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub telegram: TelegramConfig,
}

/// Liveness probe HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Fixture feed (football-data.org v4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// X-Auth-Token for the feed. Required.
    pub api_token: String,
    /// Team whose fixtures are tracked (81 = FC Barcelona).
    #[serde(default = "default_team_id")]
    pub team_id: u64,
    /// Display name for the tracked team, used in messages.
    #[serde(default = "default_team_name")]
    pub team_name: String,
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,
}

/// Reminder schedule: lead times, display timezone, daily resync boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Hours before kickoff at which reminders fire, largest first.
    #[serde(default = "default_lead_hours")]
    pub lead_hours: Vec<u32>,
    /// IANA timezone for message formatting and the daily resync boundary.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Local hour of the daily resync.
    #[serde(default)]
    pub resync_hour: u32,
    /// Local minute of the daily resync.
    #[serde(default)]
    pub resync_minute: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            lead_hours: default_lead_hours(),
            timezone: default_timezone(),
            resync_hour: 0,
            resync_minute: 0,
        }
    }
}

impl ScheduleConfig {
    /// Parse the configured timezone name.
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse()
            .map_err(|_| MatchdayError::UnknownTimezone(self.timezone.clone()))
    }
}

/// How Telegram updates reach the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
    /// Long polling — no public URL required.
    #[default]
    Polling,
    /// Registered webhook; the registration is health-checked and repaired.
    Webhook,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Required.
    pub bot_token: String,
    #[serde(default)]
    pub mode: DeliveryMode,
    /// Required when `mode = "webhook"`.
    pub webhook: Option<WebhookConfig>,
    /// Seconds between webhook registration health checks.
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_secs: u64,
}

/// Webhook deployment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Public HTTPS URL Telegram should deliver updates to.
    pub public_url: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_webhook_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_webhook_port() -> u16 {
    8443
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.matchday/matchday.db")
}
fn default_team_id() -> u64 {
    81
}
fn default_team_name() -> String {
    "FC Barcelona".to_string()
}
fn default_feed_base_url() -> String {
    "https://api.football-data.org/v4".to_string()
}
fn default_lead_hours() -> Vec<u32> {
    DEFAULT_LEAD_HOURS.to_vec()
}
fn default_timezone() -> String {
    "Asia/Jerusalem".to_string()
}
fn default_monitor_interval() -> u64 {
    DEFAULT_MONITOR_INTERVAL_SECS
}

impl MatchdayConfig {
    /// Load config from a TOML file with MATCHDAY_* env var overrides
    /// (double underscore separates nesting, e.g. MATCHDAY_TELEGRAM__BOT_TOKEN).
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.matchday/matchday.toml
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: MatchdayConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("MATCHDAY_").split("__"))
            .extract()
            .map_err(|e| MatchdayError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Startup-time validation. Missing credentials abort the process here,
    /// before any subsystem starts.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(MatchdayError::Config("telegram.bot_token is empty".into()));
        }
        if self.feed.api_token.trim().is_empty() {
            return Err(MatchdayError::Config("feed.api_token is empty".into()));
        }
        if self.schedule.lead_hours.is_empty() {
            return Err(MatchdayError::Config("schedule.lead_hours is empty".into()));
        }
        self.schedule.tz()?;
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.matchday/matchday.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> MatchdayConfig {
        MatchdayConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            feed: FeedConfig {
                api_token: "feed-token".into(),
                team_id: default_team_id(),
                team_name: default_team_name(),
                base_url: default_feed_base_url(),
            },
            schedule: ScheduleConfig::default(),
            telegram: TelegramConfig {
                bot_token: "bot-token".into(),
                mode: DeliveryMode::Polling,
                webhook: None,
                monitor_interval_secs: default_monitor_interval(),
            },
        }
    }

    #[test]
    fn defaults_match_the_original_deployment() {
        let cfg = minimal();
        assert_eq!(cfg.feed.team_id, 81);
        assert_eq!(cfg.schedule.lead_hours, vec![7, 5, 2]);
        assert_eq!(cfg.schedule.timezone, "Asia/Jerusalem");
        assert_eq!(cfg.schedule.resync_hour, 0);
        assert_eq!(cfg.telegram.mode, DeliveryMode::Polling);
    }

    #[test]
    fn empty_bot_token_rejected() {
        let mut cfg = minimal();
        cfg.telegram.bot_token = "  ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_feed_token_rejected() {
        let mut cfg = minimal();
        cfg.feed.api_token = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_timezone_rejected() {
        let mut cfg = minimal();
        cfg.schedule.timezone = "Mars/Olympus_Mons".into();
        assert!(matches!(
            cfg.validate(),
            Err(MatchdayError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn configured_timezone_parses() {
        let cfg = minimal();
        assert_eq!(cfg.schedule.tz().unwrap(), chrono_tz::Asia::Jerusalem);
    }
}
