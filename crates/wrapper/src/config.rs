//! Run configuration, built once in `main` and passed to whoever needs it

use intercept_common::env::{KEY_REPORT_TIMEOUT_MS, KEY_RESOLVE_TIMEOUT_MS, KEY_VERBOSE};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperConfig {
    pub verbose: bool,
    pub resolve_timeout: Duration,
    pub report_timeout: Duration,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            report_timeout: DEFAULT_REPORT_TIMEOUT,
        }
    }
}

impl WrapperConfig {
    /// Read timeouts and verbosity from the inherited environment.
    ///
    /// Unparsable or zero timeouts fall back to the defaults.
    pub fn from_environment(environment: &HashMap<String, String>) -> Self {
        let millis = |key: &str| {
            environment
                .get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
        };

        Self {
            verbose: environment.contains_key(KEY_VERBOSE),
            resolve_timeout: millis(KEY_RESOLVE_TIMEOUT_MS).unwrap_or(DEFAULT_RESOLVE_TIMEOUT),
            report_timeout: millis(KEY_REPORT_TIMEOUT_MS).unwrap_or(DEFAULT_REPORT_TIMEOUT),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = self.verbose || verbose;
        self
    }
}
