//! Trait abstractions for dependency injection and testability.
//!
//! Every external collaborator of the core is consumed through one of these
//! traits, so hosts plug in their own implementations and tests plug in the
//! mocks from [`crate::adapters::mock`].
//!
//! # Traits
//!
//! - [`CredentialStore`] - Session credentials, refresh and change notification
//! - [`NetworkTransport`] - HTTP request execution
//! - [`NavigationHost`] - The host's screen stack

pub mod credentials;
pub mod navigation;
pub mod transport;

pub use credentials::{CredentialStore, CredentialsError};
pub use navigation::{
    DismissHandler, DismissSignal, NavigationHost, PresentStyle, ScreenDescriptor, ScreenId,
    ScreenKind, ScreenOutput,
};
pub use transport::{Headers, Method, NetworkTransport, Request, Response, TransportError};
