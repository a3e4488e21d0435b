//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestTransport`] - HTTP transport using reqwest
//! - [`SessionCredentialStore`] - In-memory session refreshed through the backend
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for every trait:
//! - [`mock::MockTransport`] - Scripted responses, recorded requests
//! - [`mock::MockCredentialStore`] - Scripted refresh outcomes
//! - [`mock::MockNavigator`] - Screen stack driven by the test

pub mod mock;
pub mod reqwest_transport;
pub mod session_store;

pub use mock::{MockCredentialStore, MockNavigator, MockTransport};
pub use reqwest_transport::ReqwestTransport;
pub use session_store::{SessionCredentialStore, TokenResponse};
