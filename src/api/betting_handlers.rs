use std::collections::HashMap;
use std::sync::{Arc, MutexGuard};

use axum::extract::{Multipart, Path};
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::{caller_id, ok, read_form, session_id, ApiError, ApiResult, AppState};
use crate::models::{PlacedBet, StagedBet, VerificationRequest, WalletError};
use crate::wallet::{BetSlip, DocumentUpload, SlipChange};

pub fn routes() -> Router {
    Router::new()
        .route("/api/v1/betslip", get(get_slip).post(add_to_slip).delete(clear_slip))
        .route("/api/v1/betslip/commit", post(commit_slip))
        .route("/api/v1/betslip/:bet_id", delete(remove_from_slip))
        .route("/api/v1/bets", get(list_bets))
        .route("/api/v1/verification", post(submit_verification))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlipView {
    pub bets: Vec<StagedBet>,
    pub total_odds: Decimal,
    /// Set when the slip was changed by the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
}

impl SlipView {
    fn of(slip: &BetSlip, change: Option<SlipChange>) -> Result<Self, WalletError> {
        Ok(Self {
            bets: slip.bets().to_vec(),
            total_odds: slip.aggregate_odds()?,
            change: change.map(|c| format!("{:?}", c).to_lowercase()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CommitPayload {
    pub stake: Decimal,
}

fn lock_slips(state: &AppState) -> Result<MutexGuard<'_, HashMap<String, BetSlip>>, ApiError> {
    state
        .slips
        .lock()
        .map_err(|_| ApiError(WalletError::Storage("bet slip registry poisoned".to_string())))
}

async fn get_slip(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<SlipView> {
    let session = session_id(&headers)?;
    let slips = lock_slips(&state)?;
    let empty = BetSlip::new();
    ok(SlipView::of(slips.get(&session).unwrap_or(&empty), None)?)
}

async fn add_to_slip(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(bet): Json<StagedBet>,
) -> ApiResult<SlipView> {
    let session = session_id(&headers)?;
    let mut slips = lock_slips(&state)?;
    let slip = slips.entry(session).or_default();
    let change = slip.add(bet)?;
    ok(SlipView::of(slip, Some(change))?)
}

async fn remove_from_slip(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(bet_id): Path<String>,
) -> ApiResult<SlipView> {
    let session = session_id(&headers)?;
    let mut slips = lock_slips(&state)?;
    let slip = slips.entry(session).or_default();
    let change = slip.remove(&bet_id).then_some(SlipChange::Removed);
    ok(SlipView::of(slip, change)?)
}

async fn clear_slip(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<SlipView> {
    let session = session_id(&headers)?;
    let mut slips = lock_slips(&state)?;
    slips.remove(&session);
    ok(SlipView::of(&BetSlip::new(), None)?)
}

/// Place the session's slip for the caller
async fn commit_slip(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CommitPayload>,
) -> ApiResult<PlacedBet> {
    let user_id = caller_id(&headers)?;
    let session = session_id(&headers)?;

    // the registry stays unlocked while the wager commits
    let mut slip = lock_slips(&state)?.remove(&session).unwrap_or_default();
    match state.placement.commit(&user_id, &mut slip, payload.stake) {
        Ok(bet) => ok(bet),
        Err(err) => {
            // a change made meanwhile by the same session wins
            lock_slips(&state)?.entry(session).or_insert(slip);
            Err(err.into())
        }
    }
}

async fn list_bets(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Vec<PlacedBet>> {
    let user_id = caller_id(&headers)?;
    ok(state.placement.list_user_bets(&user_id)?)
}

/// Multipart form: `first_name`, `last_name`, `email` and the `document` file
async fn submit_verification(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<VerificationRequest> {
    let user_id = caller_id(&headers)?;
    let mut form = read_form(multipart).await?;
    let document = form
        .files
        .remove("document")
        .ok_or_else(|| ApiError(WalletError::validation("identity document is required")))?;

    let request = state
        .verification
        .submit_verification(
            &user_id,
            form.text("first_name"),
            form.text("last_name"),
            form.text("email"),
            DocumentUpload {
                file_name: document.file_name,
                content_type: document.content_type,
                data: document.data,
            },
        )
        .await?;
    ok(request)
}
