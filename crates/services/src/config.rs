use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ApiConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Validated settings for the HTTP quiz API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct ApiConfigDraft {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ApiConfigDraft {
    /// Validate and normalise the draft.
    ///
    /// The base URL always ends with `/` so endpoint paths join below it.
    ///
    /// # Errors
    ///
    /// Returns `ApiConfigError` for a non-http(s) or unparseable URL, or a zero timeout.
    pub fn validate(self) -> Result<ApiConfig, ApiConfigError> {
        let raw = self
            .base_url
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut base_url =
            Url::parse(&raw).map_err(|_| ApiConfigError::InvalidBaseUrl(raw.clone()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiConfigError::InvalidBaseUrl(raw));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ApiConfigError::InvalidTimeout);
        }

        Ok(ApiConfig {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl ApiConfig {
    /// Read `NAJAH_API_BASE_URL` and `NAJAH_API_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ApiConfigError` if either variable holds an invalid value.
    pub fn from_env() -> Result<Self, ApiConfigError> {
        let timeout_secs = match env::var("NAJAH_API_TIMEOUT_SECS") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ApiConfigError::InvalidTimeout)?,
            ),
            Err(_) => None,
        };
        ApiConfigDraft {
            base_url: env::var("NAJAH_API_BASE_URL").ok(),
            timeout_secs,
        }
        .validate()
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
