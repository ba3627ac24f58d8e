use serde::{Deserialize, Serialize};

use crate::models::wallet_errors::WalletError;

pub const STATUS_OK: i32 = 0;
pub const STATUS_USER_ERROR: i32 = -1;
pub const STATUS_SERVER_ERROR: i32 = -2;

/// Envelope of every HTTP response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: i32,
    pub msg: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_OK,
            msg: "ok".to_string(),
            data,
        }
    }

    pub fn error(status: i32, msg: String, data: T) -> Self {
        Self { status, msg, data }
    }
}

impl ApiResponse<Option<()>> {
    pub fn from_error(err: &WalletError) -> Self {
        let status = if err.is_user_error() { STATUS_USER_ERROR } else { STATUS_SERVER_ERROR };
        Self::error(status, format!("{}: {}", err.error_code(), err.user_message()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = ApiResponse::success(42);
        assert_eq!(response.status, STATUS_OK);
        assert_eq!(response.msg, "ok");
    }

    #[test]
    fn test_error_response() {
        let response = ApiResponse::from_error(&WalletError::validation("stake must be positive"));
        assert_eq!(response.status, STATUS_USER_ERROR);
        assert!(response.msg.starts_with("VALIDATION_ERROR: "));
        assert!(response.data.is_none());

        let response = ApiResponse::from_error(&WalletError::Storage("broken".to_string()));
        assert_eq!(response.status, STATUS_SERVER_ERROR);
    }
}
