//! Action gating ("blocker service").
//!
//! Protected actions are wrapped in a continuation and handed to
//! [`ActionGatingRegistry::guard`]. If the blocker's precondition holds the
//! continuation runs on the spot; otherwise it waits in a FIFO queue until
//! [`resume`](ActionGatingRegistry::resume) or
//! [`cancel_all`](ActionGatingRegistry::cancel_all) releases it. Every
//! continuation is released exactly once.
//!
//! ```ignore
//! registry.guard(BlockerType::Authentication, move |release| match release {
//!     Release::Proceed => post_comment(),
//!     Release::Cancelled => report_cancelled(),
//! });
//! ```

mod handle;
mod registry;
mod types;

pub use handle::BlockerHandle;
pub use registry::ActionGatingRegistry;
pub use types::{BlockerType, Continuation, GuardOutcome, Precondition, Release, SuspendListener};
