//! Navigation coordinators.
//!
//! A [`Coordinator`] shows one screen for a [`Flow`], listens for the
//! screen's dismissal and produces exactly one terminal result per
//! activation. Later dismissal signals for the same screen are ignored.
//!
//! Coordinators compose: a parent starts children with
//! [`Coordinator::start_child`], keeps them in its child table until they
//! complete, and cancels the ones still running when it finishes itself.
//! Children share the parent's [`Router`] and only know the parent's id.
//!
//! ```text
//! NotStarted --start--> Active --first signal / cancel--> Completed
//! ```

mod flow;
mod router;
mod runner;
mod slot;
mod types;

pub use flow::Flow;
pub use router::Router;
pub use runner::Coordinator;
pub use slot::{ResultSlot, TerminalResult};
pub use types::{CoordinatorId, CoordinatorState, PresentationMode};
