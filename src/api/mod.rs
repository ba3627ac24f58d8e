//! HTTP gateway
//!
//! JSON API over the wallet, betting, KYC and back-office operations. Every
//! response uses the `ApiResponse { status, msg, data }` envelope. The caller
//! is identified by the `x-user-id` header; bet slips are kept per
//! `x-session-id`.

pub mod admin_handlers;
pub mod betting_handlers;
pub mod sports_handlers;
pub mod wallet_handlers;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::Multipart;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use tower_http::cors::CorsLayer;

use crate::models::{ApiResponse, User, WalletError};
use crate::services::{GameAssetService, ObjectStore, OddsClient, PaymentProcessor};
use crate::store::DocStore;
use crate::wallet::{
    BalanceStore, BetPlacement, BetSlip, DepositIntake, UserDirectory, VerificationWorkflow,
    WithdrawalWorkflow,
};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const SESSION_ID_HEADER: &str = "x-session-id";

pub struct AppState {
    pub users: UserDirectory,
    pub balances: BalanceStore,
    pub deposits: DepositIntake,
    pub withdrawals: WithdrawalWorkflow,
    pub placement: BetPlacement,
    pub verification: VerificationWorkflow,
    pub game_assets: GameAssetService,
    pub objects: Arc<dyn ObjectStore>,
    pub odds: Arc<OddsClient>,
    /// Bet slips by session id
    pub slips: Mutex<HashMap<String, BetSlip>>,
}

impl AppState {
    pub fn new(
        store: Arc<DocStore>,
        objects: Arc<dyn ObjectStore>,
        processor: Arc<dyn PaymentProcessor>,
        odds: Arc<OddsClient>,
        welcome_bonus: Decimal,
    ) -> Self {
        let balances = BalanceStore::new(store.clone());
        Self {
            users: UserDirectory::new(store.clone()),
            deposits: DepositIntake::new(balances.clone(), processor),
            withdrawals: WithdrawalWorkflow::new(balances.clone(), welcome_bonus),
            placement: BetPlacement::new(balances.clone()),
            verification: VerificationWorkflow::new(store.clone(), objects.clone()),
            game_assets: GameAssetService::new(store, objects.clone()),
            balances,
            objects,
            odds,
            slips: Mutex::new(HashMap::new()),
        }
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(wallet_handlers::routes())
        .merge(betting_handlers::routes())
        .merge(sports_handlers::routes())
        .merge(admin_handlers::routes())
        .route("/api/v1/uploads", post(upload_file))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
}

/// Domain error rendered as an `ApiResponse` with a matching HTTP status
#[derive(Debug)]
pub struct ApiError(pub WalletError);

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &WalletError) -> StatusCode {
    match err {
        WalletError::Validation(_)
        | WalletError::InsufficientFunds { .. }
        | WalletError::ExceedsWithdrawable { .. } => StatusCode::BAD_REQUEST,
        WalletError::AlreadyProcessed(_) => StatusCode::CONFLICT,
        WalletError::NotFound(_) => StatusCode::NOT_FOUND,
        WalletError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        WalletError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        WalletError::Storage(_) | WalletError::ReconciliationRequired { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_user_error() {
            log::warn!("request rejected: {}", self.0);
        } else {
            log::error!("request failed: {}", self.0);
        }
        (status_for(&self.0), Json(ApiResponse::from_error(&self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Authenticated caller id
pub fn caller_id(headers: &HeaderMap) -> Result<String, ApiError> {
    header(headers, USER_ID_HEADER)
        .map(str::to_string)
        .ok_or_else(|| ApiError(WalletError::PermissionDenied("missing caller identity".to_string())))
}

pub fn session_id(headers: &HeaderMap) -> Result<String, ApiError> {
    header(headers, SESSION_ID_HEADER)
        .map(str::to_string)
        .ok_or_else(|| ApiError(WalletError::validation("missing session id")))
}

/// The calling user, provided it holds the admin role
pub fn require_admin_caller(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let caller = caller_id(headers)?;
    Ok(state.users.require_admin(&caller)?)
}

/// One uploaded file of a multipart form
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Text fields and files of a multipart form
#[derive(Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

pub async fn read_form(mut multipart: Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::default();
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        ApiError(WalletError::validation(format!("invalid form: {}", e)))
    };

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_form)?.to_vec();
                form.files.insert(name, UploadedFile { file_name, content_type, data });
            }
            None => {
                let value = field.text().await.map_err(bad_form)?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("healthy"))
}

/// Generic image upload, returns the public URL
async fn upload_file(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> ApiResult<String> {
    caller_id(&headers)?;
    let mut form = read_form(multipart).await?;
    let file = form
        .files
        .remove("file")
        .ok_or_else(|| ApiError(WalletError::validation("no file provided")))?;
    if file.data.is_empty() {
        return Err(ApiError(WalletError::validation("no file provided")));
    }

    let url = crate::services::upload_file(
        state.objects.as_ref(),
        &file.file_name,
        file.data,
        &file.content_type,
    )
    .await
    .map_err(|e| ApiError(WalletError::external("object store", format!("{:#}", e))))?;
    ok(url)
}
