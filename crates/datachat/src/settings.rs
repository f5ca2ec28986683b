use std::env;
use std::error::Error;
use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::time::Duration;

use datachat_core::DEFAULT_REVEAL_INTERVAL;
use datachat_http_transport::{HttpTransportConfig, HttpTransportConfigBuilder};

const BASE_URL_VAR: &str = "DATACHAT_BASE_URL";
const TIMEOUT_VAR: &str = "DATACHAT_TIMEOUT_MS";
const REVEAL_INTERVAL_VAR: &str = "DATACHAT_REVEAL_INTERVAL_MS";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings of the terminal client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Where the answering service lives.
    pub base_url: String,
    /// How long to wait for an answer.
    pub timeout: Duration,
    /// How often a new word of an answer is shown.
    pub reveal_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
        }
    }
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the settings through `lookup`, which maps a variable name to
    /// its value. Missing variables fall back to the defaults.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            let base_url = base_url.trim();
            if !base_url.is_empty() {
                settings.base_url = base_url.to_owned();
            }
        }
        if let Some(timeout) = read_millis(&lookup, TIMEOUT_VAR)? {
            settings.timeout = timeout;
        }
        if let Some(interval) = read_millis(&lookup, REVEAL_INTERVAL_VAR)? {
            settings.reveal_interval = interval;
        }
        Ok(settings)
    }

    /// Returns the HTTP transport configuration for these settings.
    pub fn http_config(&self) -> HttpTransportConfig {
        HttpTransportConfigBuilder::with_base_url(&self.base_url)
            .with_timeout(self.timeout)
            .build()
    }
}

fn read_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, SettingsError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(millis) => Ok(Some(Duration::from_millis(millis))),
        Err(source) => Err(SettingsError { var, value, source }),
    }
}

/// A variable that does not hold a number of milliseconds.
#[derive(Debug)]
pub struct SettingsError {
    var: &'static str,
    value: String,
    source: ParseIntError,
}

impl SettingsError {
    /// Returns the name of the offending variable.
    #[inline]
    pub fn var(&self) -> &str {
        self.var
    }
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} must be a number of milliseconds, got {:?}",
            self.var, self.value
        )
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
