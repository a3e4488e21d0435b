//! Refresh cycle bookkeeping.

use futures::future::{BoxFuture, Shared};

use crate::auth::Credentials;
use crate::traits::CredentialsError;

/// Outcome every request attached to a refresh cycle observes.
pub type RefreshResult = Result<Credentials, CredentialsError>;

pub(crate) type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

/// At most one refresh per pipeline is in flight.
///
/// `token` is the access token the cycle was started for.
pub(crate) enum RefreshState {
    Idle,
    InFlight {
        cycle: u64,
        token: Option<String>,
        refresh: SharedRefresh,
    },
    /// The last cycle failed and no refresh is running.
    Failed {
        cycle: u64,
        token: Option<String>,
        error: CredentialsError,
    },
}

impl RefreshState {
    /// Cycle currently in flight.
    pub(crate) fn cycle(&self) -> Option<u64> {
        match self {
            RefreshState::InFlight { cycle, .. } => Some(*cycle),
            RefreshState::Idle | RefreshState::Failed { .. } => None,
        }
    }

    /// Settle `cycle` if it is still the one in flight. A failure is kept
    /// until the next cycle starts.
    pub(crate) fn settle(&mut self, cycle: u64, result: &RefreshResult) -> bool {
        let token = match self {
            RefreshState::InFlight {
                cycle: current,
                token,
                ..
            } if *current == cycle => token.take(),
            _ => return false,
        };
        *self = match result {
            Ok(_) => RefreshState::Idle,
            Err(error) => RefreshState::Failed {
                cycle,
                token,
                error: error.clone(),
            },
        };
        true
    }

    /// Failure of the last cycle while the session has not moved on since:
    /// the store still has no access token, or still has the one the failed
    /// cycle ran for.
    pub(crate) fn settled_failure(&self, current_token: Option<&str>) -> Option<(u64, CredentialsError)> {
        match self {
            RefreshState::Failed { cycle, token, error }
                if current_token.is_none() || current_token == token.as_deref() =>
            {
                Some((*cycle, error.clone()))
            }
            _ => None,
        }
    }
}
