//! Deposit intake: processor captures, manual admin credits and user
//! deposit notifications all end in the same balance primitive.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::common_utils::get_current_timestamp_ms;
use crate::models::{
    validate_user_id, DepositNotification, EntryStatus, LedgerEntry, LedgerKind, ManualDeposit,
    Posting, ProcessorDeposit, ReviewAction, ReviewStatus, User, WalletError,
};
use crate::services::paypal::{CaptureOutcome, PaymentProcessor, ProcessorOrder};
use crate::store::{abort, Collection, DocStore, StoreTx, TxResult};
use crate::utils::new_record_id;
use crate::wallet::balance::{apply_delta_in, validate_amount, BalanceStore};
use crate::{log_balance_applied, log_reconciliation_required, log_review_processed};

const PROCESSOR_COLLECTIONS: [Collection; 3] =
    [Collection::Users, Collection::WalletTransactions, Collection::Deposits];
const MANUAL_COLLECTIONS: [Collection; 3] =
    [Collection::Users, Collection::WalletTransactions, Collection::ManualDeposits];
const NOTIFICATION_COLLECTIONS: [Collection; 4] = [
    Collection::Users,
    Collection::WalletTransactions,
    Collection::ManualDeposits,
    Collection::DepositNotifications,
];

/// Credit tagged `manual_deposit` plus its audit record
fn manual_credit_in(
    tx: &StoreTx<'_>,
    admin_id: &str,
    user_id: &str,
    amount: Decimal,
    notification_id: Option<&str>,
    now: i64,
) -> TxResult<LedgerEntry> {
    let posting = Posting::credit(LedgerKind::ManualDeposit, amount, Some(admin_id.to_string()));
    let entry = apply_delta_in(tx, user_id, &posting, now)?;

    let record = ManualDeposit {
        id: entry.id.clone(),
        user_id: user_id.to_string(),
        amount,
        admin_id: admin_id.to_string(),
        notification_id: notification_id.map(str::to_string),
        status: EntryStatus::Completed,
        created_at: now,
    };
    tx.append(Collection::ManualDeposits, &record.id, &record)?;
    Ok(entry)
}

pub struct DepositIntake {
    balances: BalanceStore,
    processor: Arc<dyn PaymentProcessor>,
}

impl DepositIntake {
    pub fn new(balances: BalanceStore, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { balances, processor }
    }

    fn store(&self) -> &DocStore {
        self.balances.store()
    }

    /// Open a processor order for the payer to approve
    pub async fn create_order(&self, amount: Decimal) -> Result<ProcessorOrder, WalletError> {
        validate_amount(amount, "amount")?;
        self.processor
            .create_order(amount)
            .await
            .map_err(|e| WalletError::external(self.processor.name(), format!("{:#}", e)))
    }

    /// Credit a completed capture. Each order id is credited at most once.
    pub fn credit_processor_capture(
        &self,
        user_id: &str,
        order_id: &str,
        settled_amount: Decimal,
    ) -> Result<LedgerEntry, WalletError> {
        validate_user_id(user_id)?;
        validate_amount(settled_amount, "captured amount")?;
        if order_id.is_empty() {
            return Err(WalletError::validation("order id is required"));
        }

        let now = get_current_timestamp_ms();
        let entry = self.store().with_transaction(&PROCESSOR_COLLECTIONS, |tx| {
            if tx.get::<ProcessorDeposit>(Collection::Deposits, order_id)?.is_some() {
                return abort(WalletError::AlreadyProcessed(format!("payment {}", order_id)));
            }

            let posting = Posting::credit(
                LedgerKind::DepositPaypal,
                settled_amount,
                Some(order_id.to_string()),
            );
            let entry = apply_delta_in(tx, user_id, &posting, now)?;
            let email = tx.get::<User>(Collection::Users, user_id)?.and_then(|u| u.email);

            let deposit = ProcessorDeposit {
                order_id: order_id.to_string(),
                user_id: user_id.to_string(),
                user_email: email,
                amount: settled_amount,
                ledger_entry_id: entry.id.clone(),
                status: EntryStatus::Completed,
                created_at: now,
            };
            tx.append(Collection::Deposits, order_id, &deposit)?;
            Ok(entry)
        })?;

        log_balance_applied!(entry);
        Ok(entry)
    }

    /// Capture an approved order and credit the amount the processor settled.
    ///
    /// If the processor completed the capture but the credit fails, the
    /// result is `ReconciliationRequired` carrying the order id.
    pub async fn confirm_processor_capture(
        &self,
        user_id: &str,
        order_id: &str,
    ) -> Result<LedgerEntry, WalletError> {
        validate_user_id(user_id)?;
        if order_id.is_empty() {
            return Err(WalletError::validation("order id is required"));
        }

        let outcome = self
            .processor
            .capture_order(order_id)
            .await
            .map_err(|e| WalletError::external(self.processor.name(), format!("{:#}", e)))?;

        let settled_amount = match outcome {
            CaptureOutcome::Completed { settled_amount } => settled_amount,
            CaptureOutcome::CompletedUnreadable { reason } => {
                log_reconciliation_required!(order_id, user_id, "unknown", reason.as_str());
                return Err(WalletError::ReconciliationRequired {
                    order_id: order_id.to_string(),
                    reason,
                });
            }
            CaptureOutcome::NotCompleted { message } => {
                return Err(WalletError::external(self.processor.name(), message));
            }
        };

        match self.credit_processor_capture(user_id, order_id, settled_amount) {
            Ok(entry) => Ok(entry),
            Err(err @ WalletError::AlreadyProcessed(_)) => Err(err),
            Err(err) => {
                let reason = err.to_string();
                log_reconciliation_required!(order_id, user_id, settled_amount, reason.as_str());
                Err(WalletError::ReconciliationRequired {
                    order_id: order_id.to_string(),
                    reason,
                })
            }
        }
    }

    /// Admin credit tagged `manual_deposit`
    pub fn manual_credit(
        &self,
        admin_id: &str,
        user_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, WalletError> {
        validate_user_id(user_id)?;
        validate_amount(amount, "amount")?;

        let now = get_current_timestamp_ms();
        let entry = self.store().with_transaction(&MANUAL_COLLECTIONS, |tx| {
            manual_credit_in(tx, admin_id, user_id, amount, None, now)
        })?;

        log_balance_applied!(entry);
        Ok(entry.balance_after)
    }

    /// Record an out-of-band transfer claimed by the user. No balance effect.
    pub fn submit_deposit_notification(
        &self,
        user_id: &str,
        user_email: Option<&str>,
        amount: Decimal,
        reference: &str,
        notes: Option<&str>,
    ) -> Result<DepositNotification, WalletError> {
        validate_user_id(user_id)?;
        validate_amount(amount, "amount")?;
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(WalletError::validation("transfer reference is required"));
        }

        let notification = DepositNotification {
            id: new_record_id(),
            user_id: user_id.to_string(),
            user_email: user_email.map(str::to_string),
            amount,
            reference: reference.to_string(),
            notes: notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
            status: ReviewStatus::Pending,
            created_at: get_current_timestamp_ms(),
            processed_at: None,
            processed_by: None,
        };

        self.store().with_transaction(&[Collection::DepositNotifications], |tx| {
            tx.append(Collection::DepositNotifications, &notification.id, &notification)
        })?;

        log::info!(
            "deposit notification {} from {} for {}",
            notification.id,
            user_id,
            amount
        );
        Ok(notification)
    }

    fn review_notification(
        &self,
        notification_id: &str,
        action: ReviewAction,
        admin_id: &str,
    ) -> Result<DepositNotification, WalletError> {
        let now = get_current_timestamp_ms();
        let (notification, entry) = self.store().with_transaction(&NOTIFICATION_COLLECTIONS, |tx| {
            let mut notification = match tx
                .get::<DepositNotification>(Collection::DepositNotifications, notification_id)?
            {
                Some(n) => n,
                None => {
                    return abort(WalletError::NotFound(format!(
                        "deposit notification {}",
                        notification_id
                    )))
                }
            };

            let what = format!("deposit notification {}", notification_id);
            notification.status = match notification.status.apply(action, &what) {
                Ok(status) => status,
                Err(e) => return abort(e),
            };

            let entry = match action {
                ReviewAction::Approve => Some(manual_credit_in(
                    tx,
                    admin_id,
                    &notification.user_id,
                    notification.amount,
                    Some(notification_id),
                    now,
                )?),
                ReviewAction::Reject => None,
            };

            notification.processed_at = Some(now);
            notification.processed_by = Some(admin_id.to_string());
            tx.put(Collection::DepositNotifications, notification_id, &notification)?;
            Ok((notification, entry))
        })?;

        if let Some(entry) = entry {
            log_balance_applied!(entry);
        }
        log_review_processed!(
            "DEPOSIT_NOTIFICATION_PROCESSED",
            notification_id,
            notification.status,
            admin_id
        );
        Ok(notification)
    }

    /// Approve a pending notification: credits like a manual admin credit
    pub fn approve_deposit_notification(
        &self,
        notification_id: &str,
        admin_id: &str,
    ) -> Result<DepositNotification, WalletError> {
        self.review_notification(notification_id, ReviewAction::Approve, admin_id)
    }

    pub fn reject_deposit_notification(
        &self,
        notification_id: &str,
        admin_id: &str,
    ) -> Result<DepositNotification, WalletError> {
        self.review_notification(notification_id, ReviewAction::Reject, admin_id)
    }

    /// Notifications, newest first, optionally filtered by status
    pub fn list_deposit_notifications(
        &self,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<DepositNotification>, WalletError> {
        let mut notifications: Vec<DepositNotification> =
            self.store().scan(Collection::DepositNotifications)?;
        notifications.retain(|n| status.map_or(true, |s| n.status == s));
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notifications)
    }

    /// Processor deposits of a user, newest first
    pub fn list_processor_deposits(&self, user_id: &str) -> Result<Vec<ProcessorDeposit>, WalletError> {
        let mut deposits: Vec<ProcessorDeposit> = self.store().scan(Collection::Deposits)?;
        deposits.retain(|d| d.user_id == user_id);
        deposits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(deposits)
    }
}
