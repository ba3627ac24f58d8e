use serde::{Deserialize, Serialize};

use crate::models::user::VerificationStatus;

/// KYC submission, one document per user (`verifications` collection, keyed by user id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document_url: String,
    pub status: VerificationStatus,
    pub created_at: i64,
    pub decided_at: Option<i64>,
    pub decided_by: Option<String>,
}

/// Admin outcome of a KYC review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Verified,
    Rejected,
}

impl From<VerificationDecision> for VerificationStatus {
    fn from(decision: VerificationDecision) -> Self {
        match decision {
            VerificationDecision::Verified => VerificationStatus::Verified,
            VerificationDecision::Rejected => VerificationStatus::Rejected,
        }
    }
}
