//! Appeal form for a commenter whose comment was moderated.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::coordinator::Flow;
use crate::error::CoordinatorError;
use crate::traits::{DismissSignal, ScreenDescriptor, ScreenKind, ScreenOutput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppealContext {
    pub comment_id: String,
    /// Reasons the user may pick from; at least one is required
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppealSubmission {
    pub reason: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppealOutcome {
    Submitted(AppealSubmission),
    Closed,
}

#[derive(Debug, Default)]
pub struct CommenterAppealFlow;

impl Flow for CommenterAppealFlow {
    type Context = AppealContext;
    type Output = AppealOutcome;

    fn name(&self) -> &'static str {
        "commenter_appeal"
    }

    fn screen(&self, context: &AppealContext) -> Result<ScreenDescriptor, CoordinatorError> {
        if context.comment_id.trim().is_empty() {
            return Err(CoordinatorError::InvalidContext {
                flow: self.name(),
                message: "comment id is empty".to_string(),
            });
        }
        if context.reasons.is_empty() {
            return Err(CoordinatorError::InvalidContext {
                flow: self.name(),
                message: "no appeal reasons".to_string(),
            });
        }
        Ok(ScreenDescriptor::new(ScreenKind::CommenterAppeal).with_payload(json!({
            "comment_id": context.comment_id,
            "reasons": context.reasons,
        })))
    }

    fn map_dismissal(&self, signal: DismissSignal) -> AppealOutcome {
        match signal {
            DismissSignal::Done(ScreenOutput::Value(value)) => serde_json::from_value(value)
                .map(AppealOutcome::Submitted)
                .unwrap_or(AppealOutcome::Closed),
            _ => AppealOutcome::Closed,
        }
    }

    fn cancelled(&self) -> AppealOutcome {
        AppealOutcome::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AppealContext {
        AppealContext {
            comment_id: "c1".to_string(),
            reasons: vec!["not_spam".to_string()],
        }
    }

    #[test]
    fn test_requires_reasons() {
        let mut ctx = context();
        ctx.reasons.clear();
        assert!(CommenterAppealFlow.screen(&ctx).is_err());
        assert!(CommenterAppealFlow.screen(&context()).is_ok());
    }

    #[test]
    fn test_submission_mapping() {
        let outcome = CommenterAppealFlow.map_dismissal(DismissSignal::Done(ScreenOutput::Value(
            json!({ "reason": "not_spam", "message": "it was a joke" }),
        )));
        assert_eq!(
            outcome,
            AppealOutcome::Submitted(AppealSubmission {
                reason: "not_spam".to_string(),
                message: Some("it was a joke".to_string()),
            })
        );
        assert_eq!(
            CommenterAppealFlow.map_dismissal(DismissSignal::ModalDismissed),
            AppealOutcome::Closed
        );
    }
}
