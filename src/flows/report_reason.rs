//! Reason picker shown before a comment is reported.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::coordinator::Flow;
use crate::error::CoordinatorError;
use crate::traits::{DismissSignal, ScreenDescriptor, ScreenKind, ScreenOutput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportReasonContext {
    pub comment_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl ReportReasonContext {
    pub fn new(comment_id: impl Into<String>) -> Self {
        Self {
            comment_id: comment_id.into(),
            parent_id: None,
        }
    }
}

/// What the screen hands back on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub reason: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportReasonOutcome {
    Submitted(ReportSubmission),
    Cancelled,
}

#[derive(Debug, Default)]
pub struct ReportReasonFlow;

impl Flow for ReportReasonFlow {
    type Context = ReportReasonContext;
    type Output = ReportReasonOutcome;

    fn name(&self) -> &'static str {
        "report_reason"
    }

    fn screen(&self, context: &ReportReasonContext) -> Result<ScreenDescriptor, CoordinatorError> {
        if context.comment_id.trim().is_empty() {
            return Err(CoordinatorError::InvalidContext {
                flow: self.name(),
                message: "comment id is empty".to_string(),
            });
        }
        Ok(ScreenDescriptor::new(ScreenKind::ReportReason).with_payload(json!({
            "comment_id": context.comment_id,
            "parent_id": context.parent_id,
        })))
    }

    fn map_dismissal(&self, signal: DismissSignal) -> ReportReasonOutcome {
        match signal {
            DismissSignal::Done(ScreenOutput::Value(value)) => {
                match serde_json::from_value::<ReportSubmission>(value) {
                    Ok(submission) => ReportReasonOutcome::Submitted(submission),
                    Err(e) => {
                        tracing::warn!(error = %e, "Unreadable report submission");
                        ReportReasonOutcome::Cancelled
                    }
                }
            }
            _ => ReportReasonOutcome::Cancelled,
        }
    }

    fn cancelled(&self) -> ReportReasonOutcome {
        ReportReasonOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_comment_id_is_invalid() {
        let err = ReportReasonFlow.screen(&ReportReasonContext::new(" ")).unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidContext { flow: "report_reason", .. }));
    }

    #[test]
    fn test_submission_mapping() {
        let outcome = ReportReasonFlow.map_dismissal(DismissSignal::Done(ScreenOutput::Value(
            json!({ "reason": "spam" }),
        )));
        assert_eq!(
            outcome,
            ReportReasonOutcome::Submitted(ReportSubmission {
                reason: "spam".to_string(),
                details: None,
            })
        );
    }

    #[test]
    fn test_malformed_submission_cancels() {
        let outcome = ReportReasonFlow.map_dismissal(DismissSignal::Done(ScreenOutput::Value(json!(3))));
        assert_eq!(outcome, ReportReasonOutcome::Cancelled);
        assert_eq!(
            ReportReasonFlow.map_dismissal(DismissSignal::Back),
            ReportReasonOutcome::Cancelled
        );
    }
}
