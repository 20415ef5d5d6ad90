//! Client configuration.
//!
//! The transport defaults are spelled out as constants: the service is
//! called with no request timeout and every operation makes a single
//! attempt.

use std::time::Duration;

use crate::error::ApiError;

/// Production endpoint of the payment service.
pub const DEFAULT_BASE_URL: &str = "https://pay.deploily.cloud/api/v1";

/// No timeout: a request waits for as long as the transport lets it.
pub const DEFAULT_TIMEOUT: Option<Duration> = None;

/// Each operation is sent exactly once. Failures are never retried.
pub const MAX_ATTEMPTS: u32 = 1;

pub const BASE_URL_ENV: &str = "TTK_EPAY_BASE_URL";
pub const TIMEOUT_SECS_ENV: &str = "TTK_EPAY_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `TTK_EPAY_BASE_URL` and `TTK_EPAY_TIMEOUT_SECS`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with an injectable variable lookup.
    ///
    /// A timeout of `0` means no timeout.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_SECS_ENV).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("{TIMEOUT_SECS_ENV} must be a whole number of seconds, got {raw:?}")))?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}
