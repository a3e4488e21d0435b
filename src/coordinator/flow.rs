//! The behaviour a coordinator is specialized with.

use crate::error::CoordinatorError;
use crate::traits::{DismissSignal, ScreenDescriptor};

/// One navigation flow: which screen to show and what its dismissal means.
///
/// A [`Coordinator`](super::Coordinator) owns the lifecycle; the flow only
/// translates between its context, the screen and the typed output.
pub trait Flow: Send + Sync + 'static {
    /// Input needed to build the screen.
    type Context: Send + 'static;
    /// Terminal result of one activation.
    type Output: Clone + Send + 'static;

    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Build the screen, or reject the context as a programmer error.
    fn screen(&self, context: &Self::Context) -> Result<ScreenDescriptor, CoordinatorError>;

    /// Map the first dismissal signal to the terminal result.
    fn map_dismissal(&self, signal: DismissSignal) -> Self::Output;

    /// Result when the flow is cancelled by its owner.
    fn cancelled(&self) -> Self::Output;

    /// Called once with the terminal result, before any listener sees it.
    fn on_complete(&self, _output: &Self::Output) {}
}
