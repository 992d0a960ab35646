// src/logging.rs

use std::env;
use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the subscriber filter.
///
/// `RUST_LOG` is used as-is when set. `LOG_LEVEL`, when set, adds a global
/// level on top of it (and so wins for the global level). With neither set
/// the filter is `info`.
pub fn env_filter(rust_log: Option<&str>, log_level: Option<&str>) -> EnvFilter {
    let rust_log = rust_log.map(str::trim).filter(|s| !s.is_empty());
    let log_level = log_level.map(str::trim).filter(|s| !s.is_empty());

    let base = rust_log
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(log_level.unwrap_or(DEFAULT_LOG_LEVEL)));

    match (rust_log, log_level.and_then(|l| l.parse::<Directive>().ok())) {
        (Some(_), Some(directive)) => base.add_directive(directive),
        _ => base,
    }
}

/// Install the global fmt subscriber from `RUST_LOG` / `LOG_LEVEL`.
pub fn init() {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let log_level = env::var(LOG_LEVEL_VAR).ok();
    fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), log_level.as_deref()))
        .init();
}
