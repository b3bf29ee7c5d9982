use ::config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    pub telegram: TelegramConfig,
    pub fetcher: FetcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Cadence of the scheduler loop itself, in seconds.
    pub tick_period_seconds: u64,
    /// Per-user check interval when the user has no override.
    pub default_check_interval_minutes: i64,
    pub history_retention_days: i64,
    /// How long in-flight workers may finish after shutdown is requested.
    pub shutdown_grace_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub request_timeout: u64,
    pub user_agent: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "PRICEWATCH_"
            .add_source(Environment::with_prefix("PRICEWATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "Database max_connections must be greater than 0".into(),
            ));
        }

        if self.scheduler.tick_period_seconds == 0 {
            return Err(ConfigError::Message(
                "Scheduler tick_period_seconds must be greater than 0".into(),
            ));
        }

        if self.scheduler.default_check_interval_minutes < 1 {
            return Err(ConfigError::Message(
                "Scheduler default_check_interval_minutes must be at least 1".into(),
            ));
        }

        if self.scheduler.history_retention_days < 1 {
            return Err(ConfigError::Message(
                "Scheduler history_retention_days must be at least 1".into(),
            ));
        }

        if self.telegram.bot_token.is_empty() {
            return Err(ConfigError::Message("Telegram bot_token is not set".into()));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Fetcher request_timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
