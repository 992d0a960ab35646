// src/config.rs

use chrono::NaiveDate;
use serde::Deserialize;
use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::fetch::locator::DEFAULT_BASE_URL;
use crate::plan::{IngestionWindow, YearMonth};

/// Scheduler-provided window bounds, `YYYY-MM-DD`.
pub const START_DATE_VAR: &str = "BRUIN_START_DATE";
pub const END_DATE_VAR: &str = "BRUIN_END_DATE";
/// Scheduler-provided JSON object; `taxi_types` lists categories.
pub const RUN_VARS_VAR: &str = "BRUIN_VARS";

pub const BASE_URL_VAR: &str = "TRIPS_BASE_URL";
pub const OUTPUT_DIR_VAR: &str = "TRIPS_OUTPUT_DIR";
pub const FETCH_TIMEOUT_VAR: &str = "FETCH_TIMEOUT_SECS";

pub const DEFAULT_CATEGORY: &str = "yellow";
pub const DEFAULT_OUTPUT_DIR: &str = "parquet";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Malformed configuration. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a YYYY-MM-DD date: {source}")]
    InvalidDate {
        var: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("{present} is set but {missing} is not; set both or neither")]
    IncompleteWindow {
        present: &'static str,
        missing: &'static str,
    },

    #[error("window ends ({end}) before it starts ({start})")]
    ReversedWindow { start: YearMonth, end: YearMonth },

    #[error("BRUIN_VARS is not a valid JSON object: {0}")]
    InvalidRunVars(#[source] serde_json::Error),

    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidSetting {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RunVars {
    #[serde(default)]
    taxi_types: Option<Vec<String>>,
}

/// What one run ingests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub window: IngestionWindow,
    pub categories: Vec<String>,
}

impl RunConfig {
    /// An empty category list falls back to [`DEFAULT_CATEGORY`].
    pub fn new(window: IngestionWindow, categories: Vec<String>) -> Self {
        let categories = if categories.is_empty() {
            vec![DEFAULT_CATEGORY.to_string()]
        } else {
            categories
        };
        Self { window, categories }
    }

    /// Current month of `today`, default category.
    pub fn default_for(today: NaiveDate) -> Self {
        Self::new(IngestionWindow::month_of(today), Vec::new())
    }

    /// Resolve from the process environment.
    pub fn from_env(today: NaiveDate) -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup, today)
    }

    /// Resolve from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let window = match (get(START_DATE_VAR), get(END_DATE_VAR)) {
            (Some(start), Some(end)) => {
                let start = parse_date(START_DATE_VAR, &start)?;
                let end = parse_date(END_DATE_VAR, &end)?;
                let window = IngestionWindow::new(start, end);
                if window.last_month() < window.first_month() {
                    return Err(ConfigError::ReversedWindow {
                        start: window.first_month(),
                        end: window.last_month(),
                    });
                }
                window
            }
            (None, None) => IngestionWindow::month_of(today),
            (Some(_), None) => {
                return Err(ConfigError::IncompleteWindow {
                    present: START_DATE_VAR,
                    missing: END_DATE_VAR,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteWindow {
                    present: END_DATE_VAR,
                    missing: START_DATE_VAR,
                })
            }
        };

        let vars = match get(RUN_VARS_VAR) {
            Some(raw) => serde_json::from_str::<RunVars>(&raw).map_err(ConfigError::InvalidRunVars)?,
            None => RunVars::default(),
        };

        Ok(Self::new(window, vars.taxi_types.unwrap_or_default()))
    }
}

fn parse_date(var: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| ConfigError::InvalidDate {
        var,
        value: value.to_string(),
        source,
    })
}

/// Non-unicode values are passed through lossily so they fail to parse
/// instead of reading as unset.
fn env_lookup(name: &str) -> Option<String> {
    env::var_os(name).map(|v| v.to_string_lossy().into_owned())
}

/// Binary-level settings: where to read from, where to write, how long a
/// single fetch may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(base) = get(BASE_URL_VAR) {
            settings.base_url = base;
        }
        if let Some(dir) = get(OUTPUT_DIR_VAR) {
            settings.output_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(FETCH_TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidSetting {
                    var: FETCH_TIMEOUT_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidSetting {
                    var: FETCH_TIMEOUT_VAR,
                    value: raw,
                    reason: "must be positive".to_string(),
                });
            }
            settings.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}
