use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::{caller_id, ok, ApiResult, AppState};
use crate::models::{DepositNotification, LedgerEntry, WithdrawalRequest};
use crate::services::ProcessorOrder;

pub fn routes() -> Router {
    Router::new()
        .route("/api/v1/wallet/balance", get(get_balance))
        .route("/api/v1/wallet/withdrawable", get(get_withdrawable))
        .route("/api/v1/wallet/history", get(get_history))
        .route("/api/v1/wallet/paypal/orders", post(create_paypal_order))
        .route("/api/v1/wallet/paypal/orders/:order_id/capture", post(capture_paypal_order))
        .route("/api/v1/wallet/deposit-notifications", post(submit_deposit_notification))
        .route("/api/v1/wallet/withdrawals", get(list_my_withdrawals).post(request_withdrawal))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceData {
    pub user_id: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawableData {
    pub balance: Decimal,
    pub welcome_bonus: Decimal,
    pub withdrawable: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AmountPayload {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct DepositNotificationPayload {
    pub amount: Decimal,
    pub reference: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailParams {
    pub email: Option<String>,
}

async fn get_balance(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<EmailParams>,
) -> ApiResult<BalanceData> {
    let user_id = caller_id(&headers)?;
    state.users.ensure_user(&user_id, params.email.as_deref())?;
    let balance = state.balances.get_balance(&user_id)?;
    ok(BalanceData { user_id, balance })
}

async fn get_withdrawable(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<WithdrawableData> {
    let user_id = caller_id(&headers)?;
    let balance = state.balances.get_balance(&user_id)?;
    let welcome_bonus = state.withdrawals.welcome_bonus();
    ok(WithdrawableData {
        balance,
        welcome_bonus,
        withdrawable: crate::wallet::withdrawable_amount(balance, welcome_bonus),
    })
}

async fn get_history(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Vec<LedgerEntry>> {
    let user_id = caller_id(&headers)?;
    ok(state.balances.history(&user_id)?)
}

async fn create_paypal_order(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AmountPayload>,
) -> ApiResult<ProcessorOrder> {
    caller_id(&headers)?;
    ok(state.deposits.create_order(payload.amount).await?)
}

/// The credited amount is the one the processor settled, never a client value
async fn capture_paypal_order(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> ApiResult<LedgerEntry> {
    let user_id = caller_id(&headers)?;
    ok(state.deposits.confirm_processor_capture(&user_id, &order_id).await?)
}

async fn submit_deposit_notification(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<DepositNotificationPayload>,
) -> ApiResult<DepositNotification> {
    let user_id = caller_id(&headers)?;
    ok(state.deposits.submit_deposit_notification(
        &user_id,
        payload.email.as_deref(),
        payload.amount,
        &payload.reference,
        payload.notes.as_deref(),
    )?)
}

async fn request_withdrawal(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AmountPayload>,
) -> ApiResult<WithdrawalRequest> {
    let user_id = caller_id(&headers)?;
    ok(state.withdrawals.request_withdrawal(&user_id, payload.amount)?)
}

async fn list_my_withdrawals(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Vec<WithdrawalRequest>> {
    let user_id = caller_id(&headers)?;
    ok(state.withdrawals.list_user_withdrawals(&user_id)?)
}
