use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::time::parse_timezone;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/uniform-print | Working directory (database, logs) |
/// | DATABASE_PATH | `$WORK_DIR/print.db` | SQLite file |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development / staging / production |
/// | TIMEZONE | UTC | Business time zone for daily rollups |
/// | SWEEP_INTERVAL_SECS | 60 | Scheduler sweep interval |
/// | NOTIFY_WEBHOOK_URL | unset | Webhook sink; log sink when unset |
/// | NOTIFY_TIMEOUT_MS | 10000 | Webhook request timeout |
/// | LOG_LEVEL | info | Overridden by RUST_LOG |
/// | LOG_DIR | `$WORK_DIR/logs` | Daily log files, only if the directory exists |
///
/// Business thresholds (auto-confirm, liveness, retention) are constants in
/// [`crate::scheduler`], not configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub timezone: Tz,
    pub sweep_interval_secs: u64,
    pub notify_webhook_url: Option<String>,
    pub notify_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: String,
}

impl Config {
    /// Load configuration from the environment, with defaults
    pub fn from_env() -> Self {
        let work_dir =
            std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/uniform-print".into());
        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("print.db")
                .to_string_lossy()
                .into_owned()
        });
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| {
            PathBuf::from(&work_dir)
                .join("logs")
                .to_string_lossy()
                .into_owned()
        });

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("TIMEZONE")
                .map(|tz| parse_timezone(&tz))
                .unwrap_or(Tz::UTC),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(60),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            notify_timeout_ms: std::env::var("NOTIFY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            work_dir,
            database_path,
            log_dir,
        }
    }

    /// Override the paths, keeping everything else from the environment
    ///
    /// Mostly used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = PathBuf::from(&config.work_dir)
            .join("print.db")
            .to_string_lossy()
            .into_owned();
        config.http_port = http_port;
        config
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
