use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::wallet_errors::WalletError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
    strum_macros::Display, strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// KYC state mirrored onto the user record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
    strum_macros::Display, strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    None,
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Authoritative spendable funds, never negative
    pub balance: Decimal,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    pub created_at: i64,
}

impl User {
    pub fn new(id: &str, email: Option<String>, now: i64) -> Self {
        Self {
            id: id.to_string(),
            email,
            balance: Decimal::ZERO,
            role: Role::User,
            verification_status: VerificationStatus::None,
            created_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User ids are opaque, but they are used as key prefixes in the store
pub fn validate_user_id(user_id: &str) -> Result<(), WalletError> {
    if user_id.trim().is_empty() {
        return Err(WalletError::validation("user id is required"));
    }
    if user_id.contains('/') {
        return Err(WalletError::validation("user id must not contain '/'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_strings() {
        assert_eq!(Role::Admin.as_ref(), "admin");
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_json_defaults() {
        let user: User =
            serde_json::from_str(r#"{"id":"u1","balance":"12.50","created_at":1}"#).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(user.verification_status, VerificationStatus::None);
        assert_eq!(user.balance.to_string(), "12.50");
    }

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id("uid-123").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("a/b").is_err());
    }
}
