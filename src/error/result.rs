//! Result type alias for SDK operations.

use super::context::ErrorContext;
use super::sdk_error::SdkError;

/// Type alias for Results using SdkError.
pub type SdkResult<T> = Result<T, SdkError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use openweb_core::error::{ErrorContext, ResultExt};
    ///
    /// let response = pipeline
    ///     .execute(request)
    ///     .await
    ///     .context(ErrorContext::new("perform_action").with_action("post_comment"))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> SdkResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> SdkResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<SdkError>,
{
    fn context(self, ctx: ErrorContext) -> SdkResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> SdkResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
