use rust_decimal::Decimal;

use crate::common_utils::get_current_timestamp_ms;
use crate::logging::LogEvent;
use crate::models::{
    validate_user_id, BetStatus, LedgerKind, PlacedBet, PlacedSelection, Posting, WalletError,
};
use crate::store::{user_prefix, user_scoped_key, Collection};
use crate::utils::new_record_id;
use crate::wallet::balance::{apply_delta_in, validate_amount, BalanceStore};
use crate::wallet::betslip::BetSlip;
use crate::log_balance_applied;

const PLACEMENT_COLLECTIONS: [Collection; 3] =
    [Collection::Users, Collection::WalletTransactions, Collection::UserBets];

/// Commits bet slips against the balance store
pub struct BetPlacement {
    balances: BalanceStore,
}

impl BetPlacement {
    pub fn new(balances: BalanceStore) -> Self {
        Self { balances }
    }

    /// Debit `stake` and record the slip as one pending bet, atomically.
    /// The slip is cleared only when the bet was committed.
    pub fn commit(
        &self,
        user_id: &str,
        slip: &mut BetSlip,
        stake: Decimal,
    ) -> Result<PlacedBet, WalletError> {
        validate_user_id(user_id)?;
        if slip.is_empty() {
            return Err(WalletError::validation("bet slip is empty"));
        }
        validate_amount(stake, "stake")?;

        let total_odds = slip.aggregate_odds()?;
        let potential_winnings = slip.potential_winnings(stake)?;

        let now = get_current_timestamp_ms();
        let bet = PlacedBet {
            id: new_record_id(),
            user_id: user_id.to_string(),
            bets: slip.bets().iter().map(PlacedSelection::from).collect(),
            stake,
            total_odds,
            potential_winnings,
            status: BetStatus::Pending,
            created_at: now,
        };

        let entry = self.balances.store().with_transaction(&PLACEMENT_COLLECTIONS, |tx| {
            let posting = Posting::debit(LedgerKind::BetStake, stake, Some(bet.id.clone()));
            let entry = apply_delta_in(tx, user_id, &posting, now)?;
            tx.append(Collection::UserBets, &user_scoped_key(user_id, &bet.id), &bet)?;
            Ok(entry)
        })?;

        slip.clear();
        log_balance_applied!(entry);
        log::info!(
            "{}",
            LogEvent::new("BET_PLACED")
                .field("bet_id", bet.id.as_str())
                .field("user_id", user_id)
                .field("selections", bet.bets.len())
                .field("stake", stake.to_string())
                .field("total_odds", bet.total_odds.to_string())
                .field("potential_winnings", bet.potential_winnings.to_string())
                .service("betting")
                .build()
        );
        Ok(bet)
    }

    /// Placed bets of a user, newest first
    pub fn list_user_bets(&self, user_id: &str) -> Result<Vec<PlacedBet>, WalletError> {
        validate_user_id(user_id)?;
        let mut bets: Vec<PlacedBet> =
            self.balances.store().scan_prefix(Collection::UserBets, &user_prefix(user_id))?;
        bets.reverse();
        Ok(bets)
    }
}
