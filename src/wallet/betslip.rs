use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{StagedBet, WalletError};

/// Selections staged by one session before a wager is committed.
///
/// Holds at most one selection per (event, market).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetSlip {
    bets: Vec<StagedBet>,
}

/// What `BetSlip::add` did with the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlipChange {
    Added,
    Replaced,
    Removed,
}

fn odds_product<'a>(odds: impl IntoIterator<Item = &'a Decimal>) -> Result<Decimal, WalletError> {
    odds.into_iter()
        .try_fold(Decimal::ONE, |acc, odd| acc.checked_mul(*odd))
        .ok_or_else(|| WalletError::validation("combined odds are too large"))
}

/// Two decimal places, halves away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl BetSlip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a selection. The same id again deselects it; another selection
    /// on an already staged event and market replaces the old one in place.
    pub fn add(&mut self, bet: StagedBet) -> Result<SlipChange, WalletError> {
        if bet.id.is_empty() || bet.event.is_empty() || bet.market.is_empty() {
            return Err(WalletError::validation("selection id, event and market are required"));
        }
        if bet.odd <= Decimal::ZERO {
            return Err(WalletError::validation("odds must be positive"));
        }

        if let Some(pos) = self.bets.iter().position(|b| b.id == bet.id) {
            self.bets.remove(pos);
            return Ok(SlipChange::Removed);
        }

        // the slip must stay priceable with the new selection in it
        let kept = self
            .bets
            .iter()
            .filter(|b| b.event != bet.event || b.market != bet.market)
            .map(|b| &b.odd);
        odds_product(kept.chain(std::iter::once(&bet.odd)))?;

        match self
            .bets
            .iter_mut()
            .find(|b| b.event == bet.event && b.market == bet.market)
        {
            Some(existing) => {
                *existing = bet;
                Ok(SlipChange::Replaced)
            }
            None => {
                self.bets.push(bet);
                Ok(SlipChange::Added)
            }
        }
    }

    pub fn remove(&mut self, bet_id: &str) -> bool {
        let before = self.bets.len();
        self.bets.retain(|b| b.id != bet_id);
        self.bets.len() != before
    }

    pub fn clear(&mut self) {
        self.bets.clear();
    }

    pub fn bets(&self) -> &[StagedBet] {
        &self.bets
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    /// Product of all staged odds; 1 for an empty slip
    pub fn aggregate_odds(&self) -> Result<Decimal, WalletError> {
        odds_product(self.bets.iter().map(|b| &b.odd))
    }

    /// Payout including the stake
    pub fn potential_winnings(&self, stake: Decimal) -> Result<Decimal, WalletError> {
        self.aggregate_odds()?
            .checked_mul(stake)
            .map(round2)
            .ok_or_else(|| WalletError::validation("stake is too large for these odds"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BetSide;
    use rust_decimal_macros::dec;

    fn bet(id: &str, event: &str, market: &str, odd: Decimal) -> StagedBet {
        StagedBet {
            id: id.to_string(),
            event: event.to_string(),
            market: market.to_string(),
            selection: id.to_string(),
            odd,
            side: None,
        }
    }

    #[test]
    fn test_same_id_toggles_off() {
        let mut slip = BetSlip::new();
        assert_eq!(slip.add(bet("a", "e1", "1X2", dec!(2))).unwrap(), SlipChange::Added);
        assert_eq!(slip.add(bet("a", "e1", "1X2", dec!(2))).unwrap(), SlipChange::Removed);
        assert!(slip.is_empty());
    }

    #[test]
    fn test_other_market_is_kept() {
        let mut slip = BetSlip::new();
        slip.add(bet("a", "e1", "1X2", dec!(2))).unwrap();
        slip.add(bet("b", "e1", "Over/Under", dec!(1.8))).unwrap();
        slip.add(bet("c", "e2", "1X2", dec!(1.5))).unwrap();
        assert_eq!(slip.len(), 3);
        assert_eq!(slip.aggregate_odds().unwrap(), dec!(5.4));
    }

    #[test]
    fn test_replacement_keeps_position_and_side() {
        let mut slip = BetSlip::new();
        slip.add(bet("a", "e1", "1X2", dec!(2))).unwrap();
        slip.add(bet("z", "e9", "1X2", dec!(3))).unwrap();
        let mut lay = bet("b", "e1", "1X2", dec!(1.5));
        lay.side = Some(BetSide::Lay);
        assert_eq!(slip.add(lay).unwrap(), SlipChange::Replaced);

        assert_eq!(slip.bets()[0].id, "b");
        assert_eq!(slip.bets()[0].side, Some(BetSide::Lay));
    }

    #[test]
    fn test_invalid_odds_rejected() {
        let mut slip = BetSlip::new();
        assert!(slip.add(bet("a", "e1", "1X2", dec!(0))).is_err());
        assert!(slip.add(bet("", "e1", "1X2", dec!(2))).is_err());
        assert!(slip.is_empty());
    }

    #[test]
    fn test_potential_winnings_rounding() {
        let mut slip = BetSlip::new();
        slip.add(bet("a", "e1", "1X2", dec!(1.333))).unwrap();
        assert_eq!(slip.potential_winnings(dec!(7.5)).unwrap(), dec!(10.00));
        assert_eq!(round2(dec!(2.345)), dec!(2.35));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut slip = BetSlip::new();
        slip.add(bet("a", "e1", "1X2", dec!(2))).unwrap();
        slip.add(bet("b", "e2", "1X2", dec!(2))).unwrap();
        assert!(slip.remove("a"));
        assert!(!slip.remove("a"));
        slip.clear();
        assert!(slip.is_empty());
        assert_eq!(slip.aggregate_odds().unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_overflowing_odds_refused_before_staging() {
        let mut slip = BetSlip::new();
        let huge = dec!(100000000000000000);
        slip.add(bet("a", "e1", "1X2", huge)).unwrap();

        let err = slip.add(bet("b", "e2", "1X2", huge)).unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
        assert_eq!(slip.len(), 1);
        assert_eq!(slip.aggregate_odds().unwrap(), huge);

        // replacing the only selection does not multiply with the old odds
        assert_eq!(slip.add(bet("c", "e1", "1X2", huge)).unwrap(), SlipChange::Replaced);
    }

    #[test]
    fn test_overflowing_payout_is_an_error() {
        let mut slip = BetSlip::new();
        slip.add(bet("a", "e1", "1X2", dec!(100000000000000000))).unwrap();
        let err = slip.potential_winnings(dec!(100000000000000000)).unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
    }
}
