use std::collections::BTreeMap;
use std::sync::Arc;

use crate::common_utils::get_current_timestamp_ms;
use crate::models::{GameAssets, GameType, WalletError, CASINO_LOBBY_DOC, LOBBY_ASSET_KEYS};
use crate::services::object_store::ObjectStore;
use crate::store::{Collection, DocStore};

pub struct GameAssetService {
    store: Arc<DocStore>,
    objects: Arc<dyn ObjectStore>,
}

impl GameAssetService {
    pub fn new(store: Arc<DocStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Assets of one document; a missing document is an empty map
    pub fn get_assets(&self, doc_id: &str) -> Result<GameAssets, WalletError> {
        Ok(self.store.get(Collection::GameAssets, doc_id)?.unwrap_or_default())
    }

    fn merge(&self, doc_id: &str, updates: BTreeMap<String, String>) -> Result<GameAssets, WalletError> {
        let now = get_current_timestamp_ms();
        self.store.with_transaction(&[Collection::GameAssets], |tx| {
            let mut doc: GameAssets = tx.get(Collection::GameAssets, doc_id)?.unwrap_or_default();
            doc.assets.extend(updates.clone());
            doc.last_updated = Some(now);
            tx.put(Collection::GameAssets, doc_id, &doc)?;
            Ok(doc)
        })
    }

    /// Upload one image of a game and record its URL
    pub async fn upload_game_asset(
        &self,
        game: GameType,
        asset_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, WalletError> {
        if asset_key.is_empty() || asset_key.contains('/') {
            return Err(WalletError::validation("invalid asset key"));
        }
        if data.is_empty() {
            return Err(WalletError::validation("no file provided"));
        }

        let key = format!("game_assets/{}/{}.png", game, asset_key);
        let url = self
            .objects
            .upload_object(&key, data, content_type)
            .await
            .map_err(|e| WalletError::external("object store", format!("{:#}", e)))?;

        self.merge(game.doc_id(), BTreeMap::from([(asset_key.to_string(), url.clone())]))?;
        log::info!("game asset {}/{} updated", game, asset_key);
        Ok(url)
    }

    /// Replace lobby tile images. Unknown keys and non-http values are skipped.
    pub fn update_lobby_assets(
        &self,
        updates: BTreeMap<String, String>,
    ) -> Result<GameAssets, WalletError> {
        let accepted: BTreeMap<String, String> = updates
            .into_iter()
            .filter(|(key, url)| LOBBY_ASSET_KEYS.contains(&key.as_str()) && url.starts_with("http"))
            .collect();

        if accepted.is_empty() {
            return Err(WalletError::validation("no valid lobby image URLs provided"));
        }
        self.merge(CASINO_LOBBY_DOC, accepted)
    }
}
