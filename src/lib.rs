//! OpenWeb core - conversation SDK core
//!
//! Makes user actions safe across an unreliable, asynchronously
//! authenticated session:
//!
//! - [`coordinator`] - navigation units yielding one terminal result each
//! - [`blocker`] - gating registry suspending actions until login completes
//! - [`recovery`] - single-flight credential refresh with bounded retries
//! - [`sdk`] - the facade hosts embed

pub mod actions;
pub mod adapters;
pub mod auth;
pub mod blocker;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod flows;
pub mod logging;
pub mod recovery;
pub mod sdk;
pub mod traits;

mod util;

pub use sdk::{ConversationSdk, ConversationSdkBuilder};
