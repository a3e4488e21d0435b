//! Unified error handling for the conversation SDK.
//!
//! - **Error Categories**: what the caller should do next
//! - **Domain-specific Errors**: Network, Auth and Coordinator errors
//! - **Unified Error Type**: `SdkError` consolidates all error types
//! - **Error Context**: operation, action and refresh cycle of a failure
//! - **Result Type Alias**: `SdkResult<T>`
//!
//! # Example
//!
//! ```ignore
//! use openweb_core::actions::ActionKind;
//! use openweb_core::error::SdkError;
//!
//! match sdk.perform_action(ActionKind::PostComment, payload).await {
//!     Ok(response) => render(response),
//!     Err(err) if err.is_cancelled() => {}
//!     Err(err) => show_toast(err.user_message()),
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout | Yes |
//! | Auth | Session could not be recovered | No |
//! | Server | Backend errors (5xx) | Yes |
//! | Request | Backend refused the request | No |
//! | Client | Host integration bug | No |
//! | Cancelled | User closed the login flow | No |
//! | Configuration | Invalid SDK config | No |

mod auth;
mod category;
mod context;
mod coordinator;
mod network;
mod result;
mod sdk_error;

pub use auth::AuthError;
pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use coordinator::CoordinatorError;
pub use network::NetworkError;
pub use result::{ResultExt, SdkResult};
pub use sdk_error::SdkError;
