// Error types for wallet, betting and back-office operations
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    // Input errors, nothing was attempted
    #[error("Invalid input: {0}")]
    Validation(String),

    // Balance errors
    #[error("Insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: Decimal, required: Decimal },
    #[error("Amount {requested} exceeds withdrawable balance {withdrawable}")]
    ExceedsWithdrawable { requested: Decimal, withdrawable: Decimal },

    // State errors
    #[error("{0} has already been processed")]
    AlreadyProcessed(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // Infrastructure errors
    #[error("{service} error: {reason}")]
    ExternalService { service: String, reason: String },
    #[error("Storage error: {0}")]
    Storage(String),

    /// The payer was charged but the local credit did not commit
    #[error("Payment {order_id} was captured but the balance update failed: {reason}")]
    ReconciliationRequired { order_id: String, reason: String },
}

impl WalletError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn external(service: &str, err: impl std::fmt::Display) -> Self {
        Self::ExternalService { service: service.to_string(), reason: err.to_string() }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::ExceedsWithdrawable { .. } => "EXCEEDS_WITHDRAWABLE",
            Self::AlreadyProcessed(_) => "ALREADY_PROCESSED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::ReconciliationRequired { .. } => "RECONCILIATION_REQUIRED",
        }
    }

    /// Errors caused by the request itself, safe to show verbatim
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InsufficientFunds { .. }
                | Self::ExceedsWithdrawable { .. }
                | Self::AlreadyProcessed(_)
                | Self::NotFound(_)
                | Self::PermissionDenied(_)
        )
    }

    /// Message shown to the end user. Infrastructure details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExternalService { .. } | Self::Storage(_) => {
                "Service temporarily unavailable, please try again later".to_string()
            }
            Self::ReconciliationRequired { order_id, .. } => format!(
                "Your payment was received but your balance could not be updated. \
                 Please contact support with order id {}",
                order_id
            ),
            other => other.to_string(),
        }
    }
}

impl From<sled::Error> for WalletError {
    fn from(err: sled::Error) -> Self {
        WalletError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Storage(format!("serialization: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = WalletError::InsufficientFunds {
            available: Decimal::from(5),
            required: Decimal::from(10),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
        assert!(err.is_user_error());

        let err2 = WalletError::external("payment processor", "timeout");
        assert_eq!(err2.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert!(!err2.is_user_error());
    }

    #[test]
    fn test_user_message_hides_infrastructure_details() {
        let err = WalletError::Storage("io error: disk full".to_string());
        assert!(!err.user_message().contains("disk"));

        let err = WalletError::ReconciliationRequired {
            order_id: "5O190127TN364715T".to_string(),
            reason: "storage".to_string(),
        };
        assert!(err.user_message().contains("5O190127TN364715T"));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_error_display() {
        let err = WalletError::ExceedsWithdrawable {
            requested: Decimal::from(60),
            withdrawable: Decimal::from(50),
        };
        assert_eq!(err.to_string(), "Amount 60 exceeds withdrawable balance 50");
    }
}
