//! Balance store: the single source of truth for spendable funds.
//!
//! Every change goes through [`apply_delta_in`], which reads the balance,
//! refuses to go negative, writes the new balance and appends one ledger
//! entry inside the caller's transaction.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::common_utils::get_current_timestamp_ms;
use crate::log_balance_applied;
use crate::models::{
    validate_user_id, EntryStatus, LedgerEntry, Posting, User, WalletError,
};
use crate::store::{abort, user_prefix, user_scoped_key, Collection, DocStore, StoreTx, TxResult};
use crate::utils::new_record_id;

/// Collections touched by a plain balance change
pub const BALANCE_COLLECTIONS: [Collection; 2] = [Collection::Users, Collection::WalletTransactions];

/// Apply one posting inside an open transaction.
///
/// A missing user is created with balance 0 before a credit; a debit
/// against a missing user fails with `NotFound`.
pub fn apply_delta_in(
    tx: &StoreTx<'_>,
    user_id: &str,
    posting: &Posting,
    now: i64,
) -> TxResult<LedgerEntry> {
    let mut user = match tx.get::<User>(Collection::Users, user_id)? {
        Some(user) => user,
        None if posting.amount > Decimal::ZERO => User::new(user_id, None, now),
        None => return abort(WalletError::NotFound(format!("user {}", user_id))),
    };

    let new_balance = user.balance + posting.amount;
    if new_balance < Decimal::ZERO {
        return abort(WalletError::InsufficientFunds {
            available: user.balance,
            required: -posting.amount,
        });
    }
    user.balance = new_balance;
    tx.put(Collection::Users, user_id, &user)?;

    let entry = LedgerEntry {
        id: new_record_id(),
        kind: posting.kind,
        user_id: user_id.to_string(),
        amount: posting.amount,
        balance_after: new_balance,
        reference: posting.reference.clone(),
        status: EntryStatus::Completed,
        created_at: now,
    };
    tx.append(Collection::WalletTransactions, &user_scoped_key(user_id, &entry.id), &entry)?;

    Ok(entry)
}

/// Amounts entering the system must be strictly positive
pub fn validate_amount(amount: Decimal, what: &str) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::validation(format!("{} must be a positive number", what)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BalanceStore {
    store: Arc<DocStore>,
}

impl BalanceStore {
    pub fn new(store: Arc<DocStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DocStore> {
        &self.store
    }

    /// Current balance; the user record is created with 0 on first access.
    pub fn get_balance(&self, user_id: &str) -> Result<Decimal, WalletError> {
        validate_user_id(user_id)?;
        if let Some(user) = self.store.get::<User>(Collection::Users, user_id)? {
            return Ok(user.balance);
        }

        let now = get_current_timestamp_ms();
        self.store.with_transaction(&[Collection::Users], |tx| {
            match tx.get::<User>(Collection::Users, user_id)? {
                Some(user) => Ok(user.balance),
                None => {
                    tx.put(Collection::Users, user_id, &User::new(user_id, None, now))?;
                    Ok(Decimal::ZERO)
                }
            }
        })
    }

    /// Apply a signed change as one atomic unit and return the new balance.
    pub fn apply_delta(&self, user_id: &str, posting: Posting) -> Result<Decimal, WalletError> {
        validate_user_id(user_id)?;
        if posting.amount.is_zero() {
            return Err(WalletError::validation("amount must be non-zero"));
        }

        let now = get_current_timestamp_ms();
        let entry = self
            .store
            .with_transaction(&BALANCE_COLLECTIONS, |tx| apply_delta_in(tx, user_id, &posting, now))?;

        log_balance_applied!(entry);
        Ok(entry.balance_after)
    }

    /// Ledger entries of a user, newest first
    pub fn history(&self, user_id: &str) -> Result<Vec<LedgerEntry>, WalletError> {
        validate_user_id(user_id)?;
        let mut entries: Vec<LedgerEntry> =
            self.store.scan_prefix(Collection::WalletTransactions, &user_prefix(user_id))?;
        entries.reverse();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LedgerKind;

    fn balances() -> BalanceStore {
        BalanceStore::new(Arc::new(DocStore::temporary().unwrap()))
    }

    #[test]
    fn test_get_balance_creates_user() {
        let b = balances();
        assert_eq!(b.get_balance("u1").unwrap(), Decimal::ZERO);
        let user: Option<User> = b.store().get(Collection::Users, "u1").unwrap();
        assert!(user.is_some());
    }

    #[test]
    fn test_credit_creates_missing_user() {
        let b = balances();
        let posting = Posting::credit(LedgerKind::ManualDeposit, Decimal::from(40), None);
        assert_eq!(b.apply_delta("fresh", posting).unwrap(), Decimal::from(40));
    }

    #[test]
    fn test_debit_missing_user_fails() {
        let b = balances();
        let posting = Posting::debit(LedgerKind::BetStake, Decimal::from(1), None);
        let err = b.apply_delta("ghost", posting).unwrap_err();
        assert!(matches!(err, WalletError::NotFound(_)));
        let user: Option<User> = b.store().get(Collection::Users, "ghost").unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_overdraft_leaves_no_trace() {
        let b = balances();
        b.apply_delta("u1", Posting::credit(LedgerKind::ManualDeposit, Decimal::from(10), None))
            .unwrap();

        let err = b
            .apply_delta("u1", Posting::debit(LedgerKind::Withdrawal, Decimal::from(11), None))
            .unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientFunds {
                available: Decimal::from(10),
                required: Decimal::from(11)
            }
        );
        assert_eq!(b.get_balance("u1").unwrap(), Decimal::from(10));
        assert_eq!(b.history("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_zero_delta_rejected() {
        let b = balances();
        let err = b
            .apply_delta("u1", Posting::credit(LedgerKind::ManualDeposit, Decimal::ZERO, None))
            .unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
    }

    #[test]
    fn test_history_newest_first() {
        let b = balances();
        b.apply_delta("u1", Posting::credit(LedgerKind::ManualDeposit, Decimal::from(10), None))
            .unwrap();
        b.apply_delta("u1", Posting::debit(LedgerKind::BetStake, Decimal::from(3), None))
            .unwrap();

        let history = b.history("u1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, LedgerKind::BetStake);
        assert_eq!(history[0].balance_after, Decimal::from(7));
        assert_eq!(history[1].amount, Decimal::from(10));
    }
}
