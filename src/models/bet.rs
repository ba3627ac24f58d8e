use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Back: the outcome happens. Lay: it does not.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
    strum_macros::Display, strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BetSide {
    #[default]
    Back,
    Lay,
}

/// One selection on the slip, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedBet {
    /// Stable selection id, e.g. `{event}-{market}-{selection}`
    pub id: String,
    pub event: String,
    pub market: String,
    pub selection: String,
    /// Decimal odds
    pub odd: Decimal,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub side: Option<BetSide>,
}

/// Selection snapshot stored with a placed bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSelection {
    pub id: String,
    pub event: String,
    pub market: String,
    pub selection: String,
    pub odd: Decimal,
    #[serde(rename = "type")]
    pub side: BetSide,
}

impl From<&StagedBet> for PlacedSelection {
    fn from(bet: &StagedBet) -> Self {
        Self {
            id: bet.id.clone(),
            event: bet.event.clone(),
            market: bet.market.clone(),
            selection: bet.selection.clone(),
            odd: bet.odd,
            side: bet.side.unwrap_or_default(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
    strum_macros::Display, strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Void,
}

/// A committed wager (`user_bets` collection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBet {
    pub id: String,
    pub user_id: String,
    pub bets: Vec<PlacedSelection>,
    pub stake: Decimal,
    pub total_odds: Decimal,
    pub potential_winnings: Decimal,
    pub status: BetStatus,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_defaults_to_back() {
        let staged: StagedBet = serde_json::from_str(
            r#"{"id":"e1-1x2-home","event":"e1","market":"1X2","selection":"Home","odd":"2.10"}"#,
        )
        .unwrap();
        assert_eq!(staged.side, None);

        let placed = PlacedSelection::from(&staged);
        assert_eq!(placed.side, BetSide::Back);
        assert_eq!(serde_json::to_value(&placed).unwrap()["type"], "back");
    }

    #[test]
    fn test_lay_side_is_kept() {
        let staged: StagedBet = serde_json::from_str(
            r#"{"id":"x","event":"e1","market":"1X2","selection":"Away","odd":3,"type":"lay"}"#,
        )
        .unwrap();
        assert_eq!(PlacedSelection::from(&staged).side, BetSide::Lay);
    }
}
