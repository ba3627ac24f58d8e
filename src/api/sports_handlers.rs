use std::sync::Arc;

use axum::extract::Path;
use axum::routing::get;
use axum::{Extension, Router};
use serde_json::{Map, Value};

use crate::api::{ok, ApiError, ApiResult, AppState};
use crate::models::{GameAssets, WalletError};
use crate::services::{League, Sport, SportEvent};

/// Odds data and public game artwork; no caller identity required
pub fn routes() -> Router {
    Router::new()
        .route("/api/v1/sports", get(list_sports))
        .route("/api/v1/sports/:sport_id/upcoming", get(upcoming_events))
        .route("/api/v1/sports/:sport_id/inplay", get(inplay_events))
        .route("/api/v1/sports/:sport_id/leagues", get(leagues))
        .route("/api/v1/events/:event_id", get(event))
        .route("/api/v1/events/:event_id/result", get(event_result))
        .route("/api/v1/events/:event_id/odds", get(odds_summary))
        .route("/api/v1/game-assets/:doc_id", get(game_assets))
}

async fn list_sports(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Vec<Sport>> {
    ok(state.odds.sports().await)
}

async fn upcoming_events(
    Extension(state): Extension<Arc<AppState>>,
    Path(sport_id): Path<String>,
) -> ApiResult<Vec<SportEvent>> {
    ok(state.odds.upcoming_events(&sport_id).await)
}

async fn inplay_events(
    Extension(state): Extension<Arc<AppState>>,
    Path(sport_id): Path<String>,
) -> ApiResult<Vec<SportEvent>> {
    ok(state.odds.inplay_events(&sport_id).await)
}

async fn leagues(
    Extension(state): Extension<Arc<AppState>>,
    Path(sport_id): Path<String>,
) -> ApiResult<Vec<League>> {
    ok(state.odds.leagues_for_sport(&sport_id).await)
}

async fn event(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> ApiResult<Value> {
    match state.odds.event(&event_id).await {
        Some(event) => ok(event),
        None => Err(ApiError(WalletError::NotFound(format!("event {}", event_id)))),
    }
}

async fn event_result(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> ApiResult<Option<Value>> {
    ok(state.odds.event_result(&event_id).await)
}

async fn odds_summary(
    Extension(state): Extension<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> ApiResult<Map<String, Value>> {
    ok(state.odds.odds_summary(&event_id).await)
}

async fn game_assets(
    Extension(state): Extension<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> ApiResult<GameAssets> {
    ok(state.game_assets.get_assets(&doc_id)?)
}
