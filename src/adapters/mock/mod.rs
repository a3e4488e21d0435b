//! Mock implementations for testing.
//!
//! This module provides mock implementations of all trait abstractions,
//! enabling tests of the gating, recovery and navigation layers without a
//! network or a UI.
//!
//! # Available Mocks
//!
//! - [`MockTransport`] - Transport with a scripted responder and recorded requests
//! - [`MockCredentialStore`] - In-memory session with scripted refresh outcomes
//! - [`MockNavigator`] - Screen stack whose dismissals tests trigger by hand

pub mod credentials;
pub mod navigation;
pub mod transport;

pub use credentials::MockCredentialStore;
pub use navigation::{MockNavigator, Presentation};
pub use transport::MockTransport;
