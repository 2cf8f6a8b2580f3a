#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Global subscriber installation lives in its own test binary: it mutates process-wide state.

use bootkit::telemetry::{LogFormat, LoggingConfig, init_logging};

#[test]
fn second_init_reports_already_installed() {
    let cfg = LoggingConfig {
        level: "debug".to_owned(),
        format: LogFormat::Json,
    };
    assert!(init_logging(&cfg), "first install should succeed");
    assert!(!init_logging(&LoggingConfig::default()));
    tracing::info!("logging installed");
}
