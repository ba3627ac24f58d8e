//! Back-office routes; every handler first checks the caller's admin role

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::{ok, read_form, require_admin_caller, ApiError, ApiResult, AppState};
use crate::models::{
    DepositNotification, GameAssets, GameType, ReviewAction, ReviewStatus, Role, User,
    VerificationDecision, VerificationRequest, WalletError, WithdrawalRequest,
};

pub fn routes() -> Router {
    Router::new()
        .route("/api/v1/admin/users", get(list_users))
        .route("/api/v1/admin/users/:user_id/role", post(update_role))
        .route("/api/v1/admin/users/:user_id/credit", post(credit_user))
        .route("/api/v1/admin/withdrawals", get(list_withdrawals))
        .route("/api/v1/admin/withdrawals/:id", post(process_withdrawal))
        .route("/api/v1/admin/deposit-notifications", get(list_deposit_notifications))
        .route("/api/v1/admin/deposit-notifications/:id", post(process_deposit_notification))
        .route("/api/v1/admin/verifications", get(list_verifications))
        .route("/api/v1/admin/verifications/:user_id", post(decide_verification))
        .route("/api/v1/admin/game-assets/:game/:asset_key", post(upload_game_asset))
        .route("/api/v1/admin/casino-lobby", post(update_lobby_assets))
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<ReviewStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RolePayload {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct CreditPayload {
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreditData {
    pub user_id: String,
    pub balance: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub action: ReviewAction,
}

#[derive(Debug, Deserialize)]
pub struct DecisionPayload {
    pub decision: VerificationDecision,
}

async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Vec<User>> {
    require_admin_caller(&state, &headers)?;
    ok(state.users.list_users()?)
}

async fn update_role(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<RolePayload>,
) -> ApiResult<User> {
    require_admin_caller(&state, &headers)?;
    ok(state.users.update_role(&user_id, payload.role)?)
}

async fn credit_user(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<CreditPayload>,
) -> ApiResult<CreditData> {
    let admin = require_admin_caller(&state, &headers)?;
    let balance = state.deposits.manual_credit(&admin.id, &user_id, payload.amount)?;
    ok(CreditData { user_id, balance })
}

async fn list_withdrawals(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Vec<WithdrawalRequest>> {
    require_admin_caller(&state, &headers)?;
    ok(state.withdrawals.list_withdrawals(filter.status)?)
}

async fn process_withdrawal(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ReviewPayload>,
) -> ApiResult<WithdrawalRequest> {
    let admin = require_admin_caller(&state, &headers)?;
    ok(state.withdrawals.process_withdrawal(&id, payload.action, &admin.id)?)
}

async fn list_deposit_notifications(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Vec<DepositNotification>> {
    require_admin_caller(&state, &headers)?;
    ok(state.deposits.list_deposit_notifications(filter.status)?)
}

async fn process_deposit_notification(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ReviewPayload>,
) -> ApiResult<DepositNotification> {
    let admin = require_admin_caller(&state, &headers)?;
    let notification = match payload.action {
        ReviewAction::Approve => state.deposits.approve_deposit_notification(&id, &admin.id)?,
        ReviewAction::Reject => state.deposits.reject_deposit_notification(&id, &admin.id)?,
    };
    ok(notification)
}

async fn list_verifications(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Vec<VerificationRequest>> {
    require_admin_caller(&state, &headers)?;
    ok(state.verification.list_verifications()?)
}

async fn decide_verification(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(payload): Json<DecisionPayload>,
) -> ApiResult<VerificationRequest> {
    let admin = require_admin_caller(&state, &headers)?;
    ok(state.verification.decide_verification(&user_id, payload.decision, &admin.id)?)
}

/// Multipart form with the image in the `file` field
async fn upload_game_asset(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path((game, asset_key)): Path<(String, String)>,
    multipart: Multipart,
) -> ApiResult<String> {
    require_admin_caller(&state, &headers)?;
    let game: GameType = game
        .parse()
        .map_err(|_| ApiError(WalletError::validation(format!("unknown game {}", game))))?;

    let mut form = read_form(multipart).await?;
    let file = form
        .files
        .remove("file")
        .ok_or_else(|| ApiError(WalletError::validation("no file provided")))?;

    let url = state
        .game_assets
        .upload_game_asset(game, &asset_key, file.data, &file.content_type)
        .await?;
    ok(url)
}

async fn update_lobby_assets(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(updates): Json<BTreeMap<String, String>>,
) -> ApiResult<GameAssets> {
    require_admin_caller(&state, &headers)?;
    ok(state.game_assets.update_lobby_assets(updates)?)
}
