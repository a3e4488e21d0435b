//! SDK configuration.
//!
//! Use the builder pattern to customize behavior, or [`SdkConfig::from_env`]
//! for the playground and tests.
//!
//! # Example
//!
//! ```ignore
//! use openweb_core::config::SdkConfig;
//!
//! let config = SdkConfig::default()
//!     .with_api_base_url("https://api.example.com")
//!     .with_retry_budget(2);
//! ```

use std::time::Duration;

use crate::auth::ActionPolicy;
use crate::error::{SdkError, SdkResult};

pub const DEFAULT_API_BASE_URL: &str = "https://api.openweb.example";
pub const DEFAULT_RETRY_BUDGET: u32 = 1;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a coordinator does when the host misuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgrammerErrorPolicy {
    /// Panic with the error.
    Panic,
    /// Log the error and finish the flow as an aborted dismissal.
    Dismiss,
}

impl Default for ProgrammerErrorPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ProgrammerErrorPolicy::Panic
        } else {
            ProgrammerErrorPolicy::Dismiss
        }
    }
}

#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Base URL every action endpoint is resolved against
    pub api_base_url: String,
    /// Credential-triggered retries allowed per request (default: 1)
    pub retry_budget: u32,
    /// Response statuses treated as a credential failure (default: [401])
    pub unauthenticated_statuses: Vec<u16>,
    /// Replace the stored token with one returned in a response `Authorization` header
    pub absorb_response_credentials: bool,
    /// Reaction to coordinator misuse
    pub programmer_error_policy: ProgrammerErrorPolicy,
    /// Request timeout applied by `ReqwestTransport`
    pub request_timeout: Duration,
    /// Which actions need a registered user
    pub action_policy: ActionPolicy,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            retry_budget: DEFAULT_RETRY_BUDGET,
            unauthenticated_statuses: vec![401],
            absorb_response_credentials: true,
            programmer_error_policy: ProgrammerErrorPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            action_policy: ActionPolicy::default(),
        }
    }
}

impl SdkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL. A trailing slash is dropped.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn with_unauthenticated_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.unauthenticated_statuses = statuses;
        self
    }

    pub fn with_absorb_response_credentials(mut self, absorb: bool) -> Self {
        self.absorb_response_credentials = absorb;
        self
    }

    pub fn with_programmer_error_policy(mut self, policy: ProgrammerErrorPolicy) -> Self {
        self.programmer_error_policy = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_action_policy(mut self, policy: ActionPolicy) -> Self {
        self.action_policy = policy;
        self
    }

    /// Create config from environment variables.
    ///
    /// Reads `OPENWEB_API_URL`, `OPENWEB_RETRY_BUDGET` and
    /// `OPENWEB_REQUEST_TIMEOUT_SECS`; unset or unparsable values keep their
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("OPENWEB_API_URL") {
            config = config.with_api_base_url(url);
        }

        if let Some(budget) = std::env::var("OPENWEB_RETRY_BUDGET")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.retry_budget = budget;
        }

        if let Some(secs) = std::env::var("OPENWEB_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Check the values the rest of the SDK relies on.
    pub fn validate(&self) -> SdkResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(SdkError::Config {
                message: format!("api_base_url must be an http(s) URL: {}", self.api_base_url),
            });
        }
        if self.unauthenticated_statuses.is_empty() {
            return Err(SdkError::Config {
                message: "unauthenticated_statuses must not be empty".to_string(),
            });
        }
        if self
            .unauthenticated_statuses
            .iter()
            .any(|status| (200..300).contains(status))
        {
            return Err(SdkError::Config {
                message: "a success status cannot mark a credential failure".to_string(),
            });
        }
        Ok(())
    }

    /// Absolute URL for an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}
