//! Runtime configuration.
//!
//! Defaults, then a JSON file (optional), then `EUREKA_*` environment
//! variables. The log level follows the environment unless set explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `eureka_core=debug`.
    pub level: String,
    pub json: bool,
}

impl LogConfig {
    pub fn for_environment(environment: &str) -> Self {
        Self {
            level: default_log_level(environment).to_string(),
            json: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::for_environment(DEFAULT_ENVIRONMENT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Start the processor with requests held until an explicit flush.
    pub hold_requests: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 0 disables expiry.
    pub session_ttl_secs: u64,
    pub task_workers: usize,
    pub task_poll_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 30 * 60,
            task_workers: 2,
            task_poll_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EurekaConfig {
    pub environment: String,
    pub log: LogConfig,
    pub client: ClientConfig,
    pub server: ServerConfig,
}

const DEFAULT_ENVIRONMENT: &str = "development";

impl Default for EurekaConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            log: LogConfig::default(),
            client: ClientConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

impl EurekaConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::default().overlay(lookup)
    }

    /// Loads a JSON file, then applies the environment on top.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(env) = lookup("EUREKA_ENV") {
            // level tracks the environment unless it is set below
            self.log.level = default_log_level(&env).to_string();
            self.environment = env;
        }
        if let Some(level) = lookup("EUREKA_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(json) = lookup("EUREKA_LOG_JSON") {
            self.log.json = parse_bool("EUREKA_LOG_JSON", &json)?;
        }
        if let Some(hold) = lookup("EUREKA_HOLD_REQUESTS") {
            self.client.hold_requests = parse_bool("EUREKA_HOLD_REQUESTS", &hold)?;
        }
        if let Some(ttl) = lookup("EUREKA_SESSION_TTL_SECS") {
            self.server.session_ttl_secs = parse_num("EUREKA_SESSION_TTL_SECS", &ttl)?;
        }
        if let Some(workers) = lookup("EUREKA_TASK_WORKERS") {
            self.server.task_workers = parse_num("EUREKA_TASK_WORKERS", &workers)?;
        }
        if let Some(poll) = lookup("EUREKA_TASK_POLL_MS") {
            self.server.task_poll_ms = parse_num("EUREKA_TASK_POLL_MS", &poll)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.task_workers == 0 {
            return Err(ConfigError::Invalid {
                key: "task_workers",
                message: "at least one worker is required".into(),
            });
        }
        if self.server.task_poll_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "task_poll_ms",
                message: "poll interval must be positive".into(),
            });
        }
        Ok(())
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_num<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}
