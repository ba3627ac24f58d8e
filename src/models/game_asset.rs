use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const CASINO_LOBBY_DOC: &str = "casino_lobby";

/// Lobby tiles whose image can be replaced by URL
pub const LOBBY_ASSET_KEYS: [&str; 4] = ["penalty_shootout", "ruleta", "speedrun", "mines"];

/// Casino games with uploadable artwork
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
    strum_macros::Display, strum_macros::EnumString, strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameType {
    PenaltyShootout,
    Mines,
}

impl GameType {
    /// Document in `game_assets` holding this game's images
    pub fn doc_id(&self) -> &'static str {
        match self {
            GameType::PenaltyShootout => "penalty_shootout",
            GameType::Mines => "mines",
        }
    }
}

/// One `game_assets` document: asset key -> public image URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameAssets {
    pub assets: BTreeMap<String, String>,
    pub last_updated: Option<i64>,
}
