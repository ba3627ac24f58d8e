use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::wallet_errors::WalletError;

/// States of an admin-reviewed request (withdrawals, deposit notifications)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
    strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Consumes an admin decision. Only `Pending` accepts one.
    pub fn apply(self, action: ReviewAction, what: &str) -> Result<ReviewStatus, WalletError> {
        match (self, action) {
            (Self::Pending, ReviewAction::Approve) => Ok(Self::Approved),
            (Self::Pending, ReviewAction::Reject) => Ok(Self::Rejected),
            (Self::Approved, _) | (Self::Rejected, _) => {
                Err(WalletError::AlreadyProcessed(what.to_string()))
            }
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin decision
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
    strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert_eq!(
            ReviewStatus::Pending.apply(ReviewAction::Approve, "w1").unwrap(),
            ReviewStatus::Approved
        );
        assert_eq!(
            ReviewStatus::Pending.apply(ReviewAction::Reject, "w1").unwrap(),
            ReviewStatus::Rejected
        );
    }

    #[test]
    fn test_terminal_states_reject_events() {
        for status in [ReviewStatus::Approved, ReviewStatus::Rejected] {
            assert!(status.is_terminal());
            for action in [ReviewAction::Approve, ReviewAction::Reject] {
                let err = status.apply(action, "withdrawal w1").unwrap_err();
                assert_eq!(err, WalletError::AlreadyProcessed("withdrawal w1".to_string()));
            }
        }
        assert!(!ReviewStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ReviewStatus::Approved.to_string(), "approved");
        assert_eq!("pending".parse::<ReviewStatus>().unwrap(), ReviewStatus::Pending);
        assert_eq!(serde_json::to_string(&ReviewAction::Reject).unwrap(), "\"reject\"");
    }
}
