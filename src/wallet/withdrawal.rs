//! Withdrawal request/approval workflow
//!
//! ```text
//! pending --approve--> approved   (debits the balance)
//! pending --reject---> rejected   (no balance effect)
//! ```
//!
//! Funds are not reserved at request time. The withdrawable check at request
//! time is advisory; the debit at approval re-checks the balance and a failure
//! there leaves the request pending.

use rust_decimal::Decimal;

use crate::common_utils::get_current_timestamp_ms;
use crate::models::{
    validate_user_id, LedgerEntry, LedgerKind, Posting, ReviewAction, ReviewStatus, User,
    WalletError, WithdrawalRequest,
};
use crate::store::{abort, Collection};
use crate::utils::new_record_id;
use crate::wallet::balance::{apply_delta_in, validate_amount, BalanceStore};
use crate::{log_balance_applied, log_review_processed};

const APPROVAL_COLLECTIONS: [Collection; 3] =
    [Collection::Users, Collection::WalletTransactions, Collection::Withdrawals];

/// `max(0, balance - welcome_bonus)`
pub fn withdrawable_amount(balance: Decimal, welcome_bonus: Decimal) -> Decimal {
    (balance - welcome_bonus).max(Decimal::ZERO)
}

pub struct WithdrawalWorkflow {
    balances: BalanceStore,
    welcome_bonus: Decimal,
}

impl WithdrawalWorkflow {
    pub fn new(balances: BalanceStore, welcome_bonus: Decimal) -> Self {
        Self { balances, welcome_bonus }
    }

    pub fn welcome_bonus(&self) -> Decimal {
        self.welcome_bonus
    }

    pub fn withdrawable(&self, user_id: &str) -> Result<Decimal, WalletError> {
        let balance = self.balances.get_balance(user_id)?;
        Ok(withdrawable_amount(balance, self.welcome_bonus))
    }

    /// Create a pending request; the amount must not exceed the withdrawable balance
    pub fn request_withdrawal(
        &self,
        user_id: &str,
        amount: Decimal,
    ) -> Result<WithdrawalRequest, WalletError> {
        validate_user_id(user_id)?;
        validate_amount(amount, "amount")?;

        let now = get_current_timestamp_ms();
        let id = new_record_id();
        let welcome_bonus = self.welcome_bonus;

        let request = self.balances.store().with_transaction(
            &[Collection::Users, Collection::Withdrawals],
            |tx| {
                let user = tx.get::<User>(Collection::Users, user_id)?;
                let balance = user.as_ref().map_or(Decimal::ZERO, |u| u.balance);
                let withdrawable = withdrawable_amount(balance, welcome_bonus);
                if amount > withdrawable {
                    return abort(WalletError::ExceedsWithdrawable {
                        requested: amount,
                        withdrawable,
                    });
                }

                let request = WithdrawalRequest {
                    id: id.clone(),
                    user_id: user_id.to_string(),
                    user_email: user.and_then(|u| u.email),
                    amount,
                    status: ReviewStatus::Pending,
                    requested_at: now,
                    processed_at: None,
                    processed_by: None,
                };
                tx.append(Collection::Withdrawals, &request.id, &request)?;
                Ok(request)
            },
        )?;

        log::info!("withdrawal {} requested by {} for {}", request.id, user_id, amount);
        Ok(request)
    }

    /// Move a pending request to its terminal state. Approval debits the
    /// balance in the same transaction that records the new status.
    pub fn process_withdrawal(
        &self,
        withdrawal_id: &str,
        action: ReviewAction,
        admin_id: &str,
    ) -> Result<WithdrawalRequest, WalletError> {
        let now = get_current_timestamp_ms();
        let (request, entry) = self.balances.store().with_transaction(&APPROVAL_COLLECTIONS, |tx| {
            let mut request = match tx.get::<WithdrawalRequest>(Collection::Withdrawals, withdrawal_id)? {
                Some(r) => r,
                None => return abort(WalletError::NotFound(format!("withdrawal {}", withdrawal_id))),
            };

            let what = format!("withdrawal {}", withdrawal_id);
            request.status = match request.status.apply(action, &what) {
                Ok(status) => status,
                Err(e) => return abort(e),
            };

            let entry: Option<LedgerEntry> = match action {
                ReviewAction::Approve => {
                    let posting = Posting::debit(
                        LedgerKind::Withdrawal,
                        request.amount,
                        Some(withdrawal_id.to_string()),
                    );
                    Some(apply_delta_in(tx, &request.user_id, &posting, now)?)
                }
                ReviewAction::Reject => None,
            };

            request.processed_at = Some(now);
            request.processed_by = Some(admin_id.to_string());
            tx.put(Collection::Withdrawals, withdrawal_id, &request)?;
            Ok((request, entry))
        })?;

        if let Some(entry) = entry {
            log_balance_applied!(entry);
        }
        log_review_processed!("WITHDRAWAL_PROCESSED", withdrawal_id, request.status, admin_id);
        Ok(request)
    }

    /// Requests, newest first, optionally filtered by status
    pub fn list_withdrawals(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<WithdrawalRequest>, WalletError> {
        let mut requests: Vec<WithdrawalRequest> =
            self.balances.store().scan(Collection::Withdrawals)?;
        requests.retain(|r| status.map_or(true, |s| r.status == s));
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    pub fn list_user_withdrawals(&self, user_id: &str) -> Result<Vec<WithdrawalRequest>, WalletError> {
        let mut requests = self.list_withdrawals(None)?;
        requests.retain(|r| r.user_id == user_id);
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn workflow_with_balance(user_id: &str, balance: Decimal) -> WithdrawalWorkflow {
        let balances = BalanceStore::new(Arc::new(DocStore::temporary().unwrap()));
        if balance > Decimal::ZERO {
            balances
                .apply_delta(user_id, Posting::credit(LedgerKind::ManualDeposit, balance, None))
                .unwrap();
        }
        WithdrawalWorkflow::new(balances, dec!(100))
    }

    #[test]
    fn test_withdrawable_amount() {
        assert_eq!(withdrawable_amount(dec!(150), dec!(100)), dec!(50));
        assert_eq!(withdrawable_amount(dec!(80), dec!(100)), dec!(0));
    }

    #[test]
    fn test_reject_has_no_balance_effect() {
        let wf = workflow_with_balance("u1", dec!(150));
        let request = wf.request_withdrawal("u1", dec!(20)).unwrap();
        let processed = wf.process_withdrawal(&request.id, ReviewAction::Reject, "admin-1").unwrap();
        assert_eq!(processed.status, ReviewStatus::Rejected);
        assert_eq!(wf.balances.get_balance("u1").unwrap(), dec!(150));
    }

    #[test]
    fn test_unknown_withdrawal() {
        let wf = workflow_with_balance("u1", dec!(0));
        let err = wf.process_withdrawal("missing", ReviewAction::Approve, "admin-1").unwrap_err();
        assert!(matches!(err, WalletError::NotFound(_)));
    }

    #[test]
    fn test_request_for_unknown_user_exceeds_withdrawable() {
        let wf = workflow_with_balance("u1", dec!(0));
        let err = wf.request_withdrawal("u2", dec!(1)).unwrap_err();
        assert_eq!(
            err,
            WalletError::ExceedsWithdrawable { requested: dec!(1), withdrawable: dec!(0) }
        );
    }

    #[test]
    fn test_list_filters_by_status() {
        let wf = workflow_with_balance("u1", dec!(200));
        let first = wf.request_withdrawal("u1", dec!(10)).unwrap();
        wf.request_withdrawal("u1", dec!(20)).unwrap();
        wf.process_withdrawal(&first.id, ReviewAction::Approve, "admin-1").unwrap();

        assert_eq!(wf.list_withdrawals(None).unwrap().len(), 2);
        let pending = wf.list_withdrawals(Some(ReviewStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount, dec!(20));
        assert_eq!(wf.list_user_withdrawals("u1").unwrap().len(), 2);
    }
}
