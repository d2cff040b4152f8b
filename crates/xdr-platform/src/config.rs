//! Platform Configuration
//!
//! | Variable | Default |
//! |----------|---------|
//! | `XDR_API_PORT` | `8000` |
//! | `XDR_DATABASE_URL` | `sqlite://xdr.db?mode=rwc` |
//! | `XDR_DB_MAX_CONNECTIONS` | `5` |
//! | `XDR_SECRET_KEY` | development key |
//! | `XDR_TOKEN_TTL_MINUTES` | `60` |
//! | `XDR_CORS_ORIGINS` | Vite dev servers on ports 5173-5175 |
//! | `XDR_SEED_DATA` | `true` |
//! | `XDR_GENERATOR_ENABLED` | `true` |
//! | `XDR_GENERATOR_MIN_SECS` | `10` |
//! | `XDR_GENERATOR_MAX_SECS` | `30` |
//! | `XDR_LOG_FORMAT` | `pretty` (`json` for structured output) |

use std::time::Duration;

use crate::realtime::GeneratorConfig;
use crate::service::Argon2Config;

pub const DEFAULT_SECRET_KEY: &str = "xdr-secret-key-change-in-production-2026";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5174,http://localhost:5175";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub api_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub secret_key: String,
    pub token_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
    pub seed_data: bool,
    pub generator_enabled: bool,
    pub generator: GeneratorConfig,
    pub log_format: LogFormat,
    pub argon2: Argon2Config,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_port: 8000,
            database_url: "sqlite://xdr.db?mode=rwc".to_string(),
            db_max_connections: 5,
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            token_ttl_minutes: 60,
            cors_origins: split_list(DEFAULT_CORS_ORIGINS),
            seed_data: true,
            generator_enabled: true,
            generator: GeneratorConfig::default(),
            log_format: LogFormat::Pretty,
            argon2: Argon2Config::default(),
        }
    }
}

impl PlatformConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let min_secs: u64 = env_or_parse("XDR_GENERATOR_MIN_SECS", 10);
        let max_secs: u64 = env_or_parse("XDR_GENERATOR_MAX_SECS", 30);

        Self {
            api_port: env_or_parse("XDR_API_PORT", defaults.api_port),
            database_url: env_or("XDR_DATABASE_URL", &defaults.database_url),
            db_max_connections: env_or_parse("XDR_DB_MAX_CONNECTIONS", defaults.db_max_connections),
            secret_key: env_or("XDR_SECRET_KEY", DEFAULT_SECRET_KEY),
            token_ttl_minutes: env_or_parse("XDR_TOKEN_TTL_MINUTES", defaults.token_ttl_minutes),
            cors_origins: split_list(&env_or("XDR_CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            seed_data: env_flag("XDR_SEED_DATA", defaults.seed_data),
            generator_enabled: env_flag("XDR_GENERATOR_ENABLED", defaults.generator_enabled),
            generator: GeneratorConfig {
                min_interval: Duration::from_secs(min_secs),
                max_interval: Duration::from_secs(max_secs.max(min_secs)),
            },
            log_format: env_or_parse("XDR_LOG_FORMAT", defaults.log_format),
            argon2: defaults.argon2,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlatformConfig::default();
        assert_eq!(config.api_port, 8000);
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(60));
        assert_eq!(config.cors_origins.len(), 3);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" http://a:1 , ,http://b:2"),
            vec!["http://a:1".to_string(), "http://b:2".to_string()]
        );
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
