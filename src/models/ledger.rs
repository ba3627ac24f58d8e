use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What caused a balance change
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
    strum_macros::Display, strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LedgerKind {
    DepositPaypal,
    ManualDeposit,
    BetStake,
    Withdrawal,
}

impl LedgerKind {
    pub fn is_debit(&self) -> bool {
        matches!(self, LedgerKind::BetStake | LedgerKind::Withdrawal)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
    strum_macros::Display, strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Completed,
}

/// Immutable record explaining one committed balance change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub kind: LedgerKind,
    pub user_id: String,
    /// Signed: credits positive, debits negative
    pub amount: Decimal,
    pub balance_after: Decimal,
    /// Processor order id, admin id, withdrawal id or bet id
    pub reference: Option<String>,
    pub status: EntryStatus,
    pub created_at: i64,
}

/// A proposed balance change, applied by the balance store
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub kind: LedgerKind,
    pub amount: Decimal,
    pub reference: Option<String>,
}

impl Posting {
    pub fn credit(kind: LedgerKind, amount: Decimal, reference: Option<String>) -> Self {
        Self { kind, amount, reference }
    }

    pub fn debit(kind: LedgerKind, amount: Decimal, reference: Option<String>) -> Self {
        Self { kind, amount: -amount, reference }
    }
}

/// Audit record of an admin credit (`manual_deposits` collection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualDeposit {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub admin_id: String,
    pub notification_id: Option<String>,
    pub status: EntryStatus,
    pub created_at: i64,
}

/// Audit record of a processor capture credit (`deposits` collection, keyed by order id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorDeposit {
    pub order_id: String,
    pub user_id: String,
    pub user_email: Option<String>,
    pub amount: Decimal,
    pub ledger_entry_id: String,
    pub status: EntryStatus,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(LedgerKind::DepositPaypal.as_ref(), "deposit_paypal");
        assert_eq!(LedgerKind::ManualDeposit.to_string(), "manual_deposit");
        assert_eq!("bet_stake".parse::<LedgerKind>().unwrap(), LedgerKind::BetStake);
        assert!(LedgerKind::Withdrawal.is_debit());
        assert!(!LedgerKind::ManualDeposit.is_debit());
    }

    #[test]
    fn test_debit_posting_is_negative() {
        let p = Posting::debit(LedgerKind::BetStake, Decimal::from(10), None);
        assert_eq!(p.amount, Decimal::from(-10));
    }
}
