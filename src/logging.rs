/// Structured event logging for balance-affecting operations
///
/// Every committed ledger change is written as one JSON line so that
/// deposits, withdrawals and bets can be traced and reconciled from logs.

use serde_json::{json, Value};

use crate::common_utils::get_current_timestamp_ms;

/// Structured log event builder
///
/// Usage:
/// ```
/// use sportsbook::logging::LogEvent;
///
/// let log_value = LogEvent::new("BALANCE_APPLIED")
///     .field("user_id", "u-1001")
///     .field("amount", "25.00")
///     .service("wallet")
///     .build();
///
/// log::info!("{}", log_value);
/// ```
pub struct LogEvent {
    fields: serde_json::Map<String, Value>,
}

impl LogEvent {
    /// Create a new log event with the given event name
    pub fn new(event: &str) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("event".to_string(), json!(event));
        fields.insert("timestamp_ms".to_string(), json!(get_current_timestamp_ms()));

        Self { fields }
    }

    /// Add a field to the log event
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Add service name
    pub fn service(mut self, service: &str) -> Self {
        self.fields.insert("service".to_string(), json!(service));
        self
    }

    /// Build the final JSON value
    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

#[macro_export]
macro_rules! log_balance_applied {
    ($entry:expr) => {
        log::info!(
            "{}",
            $crate::logging::LogEvent::new("BALANCE_APPLIED")
                .field("entry_id", $entry.id.as_str())
                .field("user_id", $entry.user_id.as_str())
                .field("kind", $entry.kind.as_ref())
                .field("amount", $entry.amount.to_string())
                .field("balance_after", $entry.balance_after.to_string())
                .field("reference", $entry.reference.clone())
                .service("wallet")
                .build()
        );
    };
}

#[macro_export]
macro_rules! log_review_processed {
    ($event:expr, $id:expr, $status:expr, $admin_id:expr) => {
        log::info!(
            "{}",
            $crate::logging::LogEvent::new($event)
                .field("request_id", $id)
                .field("status", $status.as_ref())
                .field("admin_id", $admin_id)
                .service("wallet")
                .build()
        );
    };
}

#[macro_export]
macro_rules! log_reconciliation_required {
    ($order_id:expr, $user_id:expr, $amount:expr, $reason:expr) => {
        log::error!(
            "{}",
            $crate::logging::LogEvent::new("RECONCILIATION_REQUIRED")
                .field("order_id", $order_id)
                .field("user_id", $user_id)
                .field("amount", $amount.to_string())
                .field("reason", $reason)
                .service("wallet")
                .build()
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_builder() {
        let log = LogEvent::new("TEST_EVENT")
            .field("user_id", "u-1001")
            .field("amount", "150.00")
            .service("test")
            .build();

        assert_eq!(log["event"], "TEST_EVENT");
        assert_eq!(log["user_id"], "u-1001");
        assert_eq!(log["amount"], "150.00");
        assert_eq!(log["service"], "test");
        assert!(log.get("timestamp_ms").is_some());
    }

    #[test]
    fn test_optional_field_serializes_as_null() {
        let reference: Option<String> = None;
        let log = LogEvent::new("TEST_EVENT").field("reference", reference).build();
        assert!(log["reference"].is_null());
    }
}
