//! Configuration types and loading
//!
//! Layers, lowest priority first: built-in defaults, `config/default.*`,
//! `config/{BUILDERS_ENV}.*`, then `BUILDERS__SECTION__KEY` environment variables.

use chrono::NaiveTime;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "config";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Notification pipeline configuration
    pub notifications: NotificationConfig,

    /// Calendar sweep configuration
    pub scheduler: SchedulerConfig,

    /// Background worker pool
    pub workers: WorkerConfig,

    /// Load the demo catalog (users, materials, construction types) at startup
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Endpoint every notification envelope is POSTed to
    pub webhook_url: String,
    /// When false, records are persisted without calling the webhook
    pub external_enabled: bool,
    /// Total delivery attempts, including the first one
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub backoff_ms: u64,
    /// Per-attempt HTTP timeout
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// IANA zone the business calendar lives in
    pub timezone: String,
    pub start_at: String,
    pub finish_at: String,
    pub delivery_at: String,
    pub progress_at: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Upper bound on concurrently running background tasks
    pub pool_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            notifications: NotificationConfig {
                webhook_url: "http://localhost:9000/webhook".to_string(),
                external_enabled: true,
                max_attempts: 3,
                backoff_ms: 500,
                timeout_ms: 5000,
            },
            scheduler: SchedulerConfig {
                enabled: true,
                timezone: "America/Bogota".to_string(),
                start_at: "06:00".to_string(),
                finish_at: "23:00".to_string(),
                delivery_at: "23:05".to_string(),
                progress_at: "23:10".to_string(),
            },
            workers: WorkerConfig { pool_size: 8 },
            seed_demo_data: true,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config source error: {0}")]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(Environment::with_prefix("BUILDERS"))
    }

    fn load_with(env: Environment) -> Result<Self, ConfigError> {
        let run_env = std::env::var("BUILDERS_ENV").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
            .add_source(env.separator("__").try_parsing(true))
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.tz()?;
        for (key, value) in self.scheduler.named_times() {
            parse_time_of_day(key, value)?;
        }
        if self.notifications.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "notifications.max_attempts",
                "must be at least 1",
            ));
        }
        if self.notifications.external_enabled {
            url::Url::parse(&self.notifications.webhook_url)
                .map_err(|e| ConfigError::invalid("notifications.webhook_url", e.to_string()))?;
        }
        if self.workers.pool_size == 0 {
            return Err(ConfigError::invalid("workers.pool_size", "must be at least 1"));
        }
        Ok(())
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

impl SchedulerConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::invalid("scheduler.timezone", e.to_string()))
    }

    pub fn start_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time_of_day("scheduler.start_at", &self.start_at)
    }

    pub fn finish_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time_of_day("scheduler.finish_at", &self.finish_at)
    }

    pub fn delivery_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time_of_day("scheduler.delivery_at", &self.delivery_at)
    }

    pub fn progress_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_time_of_day("scheduler.progress_at", &self.progress_at)
    }

    fn named_times(&self) -> [(&'static str, &str); 4] {
        [
            ("scheduler.start_at", &self.start_at),
            ("scheduler.finish_at", &self.finish_at),
            ("scheduler.delivery_at", &self.delivery_at),
            ("scheduler.progress_at", &self.progress_at),
        ]
    }
}

/// Parse an `HH:MM` time of day
fn parse_time_of_day(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| ConfigError::invalid(key, format!("expected HH:MM, got {:?} ({})", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.notifications.max_attempts, 3);
        assert_eq!(config.notifications.backoff_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scheduler_times() {
        let scheduler = AppConfig::default().scheduler;
        assert_eq!(
            scheduler.start_time().unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap()
        );
        assert_eq!(
            scheduler.progress_time().unwrap(),
            NaiveTime::from_hms_opt(23, 10, 0).unwrap()
        );
        assert_eq!(scheduler.tz().unwrap(), chrono_tz::America::Bogota);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.scheduler.finish_at = "25:99".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "scheduler.finish_at"
        ));

        let mut config = AppConfig::default();
        config.scheduler.timezone = "Mars/Olympus".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.notifications.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    fn env_layer(vars: &[(&str, &str)]) -> Environment {
        Environment::with_prefix("BUILDERS").source(Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn test_env_layer_overrides_defaults() {
        let config = AppConfig::load_with(env_layer(&[
            ("BUILDERS__SERVER__PORT", "9090"),
            ("BUILDERS__SCHEDULER__TIMEZONE", "Europe/Madrid"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.scheduler.tz().unwrap(), chrono_tz::Europe::Madrid);
    }

    #[test]
    fn test_invalid_env_layer_fails_load() {
        let err = AppConfig::load_with(env_layer(&[(
            "BUILDERS__SCHEDULER__TIMEZONE",
            "America/Bogata",
        )]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "scheduler.timezone"
        ));

        let err = AppConfig::load_with(env_layer(&[("BUILDERS__NOTIFICATIONS__MAX_ATTEMPTS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig::default();
        let addr = config.server_addr();
        assert_eq!(addr.port(), 8080);
    }
}
