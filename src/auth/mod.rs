//! Authentication model for the conversation SDK.
//!
//! This module provides:
//! - Credentials and authentication levels
//! - The action policy deciding which level each user action needs

pub mod credentials;
pub mod policy;

pub use credentials::{jwt_expires_at, AuthenticationLevel, Credentials};
pub use policy::ActionPolicy;
