//! Logging setup for applications built on bootkit.
//!
//! The library itself only emits `tracing` events; installing a subscriber is the
//! application's call, typically right after the runtime is built so the `logging`
//! configuration section can drive it.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration section name read by applications.
pub const LOGGING_SECTION: &str = "logging";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set, e.g. `info` or `bootkit=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` wins; otherwise the configured level; otherwise `info`.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install a global stderr subscriber. Returns `false` if one was already installed.
#[must_use]
pub fn init_logging(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    let result = match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: LoggingConfig = serde_json::from_value(serde_json::json!({ "format": "json" }))
            .unwrap();
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.format, LogFormat::Json);
    }

    #[test]
    fn invalid_level_falls_back() {
        temp_env::with_var_unset("RUST_LOG", || {
            let cfg = LoggingConfig {
                level: "bootkit=loud".to_owned(),
                format: LogFormat::Text,
            };
            assert_eq!(cfg.env_filter().to_string(), "info");
        });
    }
}
