use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::review_fsm::ReviewStatus;

/// A user's request to cash out, decided once by an admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub amount: Decimal,
    pub status: ReviewStatus,
    pub requested_at: i64,
    pub processed_at: Option<i64>,
    pub processed_by: Option<String>,
}

/// Out-of-band transfer asserted by a user, credited only after admin approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositNotification {
    pub id: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub amount: Decimal,
    pub reference: String,
    pub notes: Option<String>,
    pub status: ReviewStatus,
    pub created_at: i64,
    pub processed_at: Option<i64>,
    pub processed_by: Option<String>,
}
