use std::time::Duration;

use relay_engine::EngineConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Delivery engine worker task count (default: `4`).
    pub engine_worker_count: usize,
    /// Delivery engine poll interval in seconds (default: `1`).
    pub engine_poll_interval_secs: u64,
    /// Claim lease timeout in seconds (default: `60`).
    pub engine_lease_timeout_secs: u64,
    /// Retry budget per delivery (default: `5`).
    pub engine_max_attempts: i64,
    /// Backoff base delay in seconds (default: `5`).
    pub engine_base_delay_secs: u64,
    /// Backoff cap in seconds (default: `300`).
    pub engine_max_delay_secs: u64,
    /// Per-attempt webhook request timeout in seconds (default: `10`).
    pub webhook_timeout_secs: u64,
    /// Stored event retention in days (default: `90`).
    pub event_retention_days: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `ENGINE_WORKER_COUNT`        | `4`                     |
    /// | `ENGINE_POLL_INTERVAL_SECS`  | `1`                     |
    /// | `ENGINE_LEASE_TIMEOUT_SECS`  | `60`                    |
    /// | `ENGINE_MAX_ATTEMPTS`        | `5`                     |
    /// | `ENGINE_BASE_DELAY_SECS`     | `5`                     |
    /// | `ENGINE_MAX_DELAY_SECS`      | `300`                   |
    /// | `WEBHOOK_TIMEOUT_SECS`       | `10`                    |
    /// | `EVENT_RETENTION_DAYS`       | `90`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            engine_worker_count: env_parse("ENGINE_WORKER_COUNT", 4),
            engine_poll_interval_secs: env_parse("ENGINE_POLL_INTERVAL_SECS", 1),
            engine_lease_timeout_secs: env_parse("ENGINE_LEASE_TIMEOUT_SECS", 60),
            engine_max_attempts: env_parse("ENGINE_MAX_ATTEMPTS", 5),
            engine_base_delay_secs: env_parse("ENGINE_BASE_DELAY_SECS", 5),
            engine_max_delay_secs: env_parse("ENGINE_MAX_DELAY_SECS", 300),
            webhook_timeout_secs: env_parse("WEBHOOK_TIMEOUT_SECS", 10),
            event_retention_days: env_parse("EVENT_RETENTION_DAYS", 90),
        }
    }

    /// The delivery engine tuning derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            worker_count: self.engine_worker_count,
            poll_interval: Duration::from_secs(self.engine_poll_interval_secs),
            lease_timeout: Duration::from_secs(self.engine_lease_timeout_secs),
            max_attempts: self.engine_max_attempts,
            base_delay: Duration::from_secs(self.engine_base_delay_secs),
            max_delay: Duration::from_secs(self.engine_max_delay_secs),
            ..EngineConfig::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid value")),
        Err(_) => default,
    }
}
