//! Error context for enriched error information.
//!
//! Context records which SDK operation failed and where in the recovery
//! machinery it was, so host logs can tie a failure to a refresh cycle or a
//! gated action.

use chrono::{DateTime, Utc};

/// Context information attached to errors for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// Human-readable description of the operation that failed.
    pub operation: String,

    /// User action that triggered the operation, if any.
    pub action: Option<String>,

    /// URL of the request that failed.
    pub url: Option<String>,

    /// Number of credential-triggered retries already spent.
    pub retry_count: u32,

    /// Refresh cycle the request was attached to.
    pub refresh_cycle: Option<u64>,

    /// Timestamp when the error occurred.
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    /// Create a new ErrorContext for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            action: None,
            url: None,
            retry_count: 0,
            refresh_cycle: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_refresh_cycle(mut self, cycle: u64) -> Self {
        self.refresh_cycle = Some(cycle);
        self
    }

    /// Get a formatted context string suitable for logging.
    pub fn to_log_string(&self) -> String {
        let mut parts = vec![format!("operation={}", self.operation)];

        if let Some(ref action) = self.action {
            parts.push(format!("action={}", action));
        }
        if let Some(ref url) = self.url {
            parts.push(format!("url={}", url));
        }
        if self.retry_count > 0 {
            parts.push(format!("retry_count={}", self.retry_count));
        }
        if let Some(cycle) = self.refresh_cycle {
            parts.push(format!("refresh_cycle={}", cycle));
        }
        parts.push(format!("timestamp={}", self.timestamp.to_rfc3339()));

        parts.join(" ")
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.operation)?;

        if let Some(ref action) = self.action {
            write!(f, " action={}", action)?;
        }

        if self.retry_count > 0 {
            write!(f, " retry={}", self.retry_count)?;
        }

        Ok(())
    }
}
