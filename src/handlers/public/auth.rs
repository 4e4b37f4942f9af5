// handlers/public/auth.rs - sign-in, federated login and account flows

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_cookies::Cookies;
use tracing::{info, warn};

use crate::cache::SESSION_TTL;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::handlers::validate::require_text;
use crate::identity::CodeDelivery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::session::{self, session_cookie};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
    pub password: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

/**
 * POST /v1/auth/login - Password sign-in
 *
 * Input: `{"email": "...", "password": "..."}`
 *
 * Output:
 * ```json
 * {
 *   "success": true,
 *   "data": {
 *     "access_token": "eyJraWQiOi...",
 *     "token_type": "Bearer",
 *     "expires_in": 3600,
 *     "username": "..."
 *   }
 * }
 * ```
 *
 * Also sets the `access_token` cookie. Any earlier session of the same user
 * stops passing the gate.
 */
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonBody(body): JsonBody<Credentials>,
) -> ApiResult<LoginResponse> {
    require_text("email", &body.email)?;
    require_text("password", &body.password)?;

    let tokens = state.identity.sign_in(&body.email, &body.password).await.map_err(|e| {
        warn!("Sign-in rejected for {}: {}", body.email, e);
        ApiError::from(e)
    })?;

    let identity = session::establish(&state, &tokens.access_token).await?;
    cookies.add(session_cookie(tokens.access_token.clone(), state.settings.cookie_secure));

    Ok(ApiResponse::success(LoginResponse {
        access_token: tokens.access_token,
        token_type: "Bearer",
        expires_in: SESSION_TTL.as_secs(),
        username: identity.username,
        id_token: tokens.id_token,
    }))
}

/// GET /v1/auth/google - start a federated sign-in through the hosted UI
pub async fn google(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.identity.authorize_url("Google")?;
    Ok(Redirect::to(&url))
}

/// GET /v1/auth/callback?code=... - hosted UI redirect target
pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing authorization code"))?;

    let tokens = state.identity.exchange_authorization_code(&code).await?;
    let identity = session::establish(&state, &tokens.access_token).await?;
    cookies.add(session_cookie(tokens.access_token, state.settings.cookie_secure));

    info!("Federated sign-in completed for {}", identity.username);
    Ok(Redirect::to(&state.settings.post_login_redirect))
}

/// POST /v1/auth/register - create an unconfirmed account, 201 with code delivery
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> ApiResult<CodeDelivery> {
    require_text("email", &body.email)?;
    require_text("password", &body.password)?;

    let delivery = state.identity.sign_up(&body.email, &body.password).await?;
    info!("Registered {}", body.email);
    Ok(ApiResponse::created(delivery))
}

/// POST /v1/auth/confirm
pub async fn confirm(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ConfirmRequest>,
) -> ApiResult<Value> {
    require_text("email", &body.email)?;
    require_text("code", &body.code)?;

    state.identity.confirm_sign_up(&body.email, &body.code).await?;
    Ok(ApiResponse::success(json!({ "confirmed": true })))
}

/// POST /v1/auth/resend
pub async fn resend(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<EmailRequest>,
) -> ApiResult<CodeDelivery> {
    require_text("email", &body.email)?;
    let delivery = state.identity.resend_confirmation_code(&body.email).await?;
    Ok(ApiResponse::success(delivery))
}

/// POST /v1/auth/forgot
pub async fn forgot(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<EmailRequest>,
) -> ApiResult<CodeDelivery> {
    require_text("email", &body.email)?;
    let delivery = state.identity.forgot_password(&body.email).await?;
    Ok(ApiResponse::success(delivery))
}

/// POST /v1/auth/reset
pub async fn reset(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ResetRequest>,
) -> ApiResult<Value> {
    require_text("email", &body.email)?;
    require_text("password", &body.password)?;
    require_text("code", &body.code)?;

    state
        .identity
        .confirm_forgot_password(&body.email, &body.password, &body.code)
        .await?;
    info!("Password reset for {}", body.email);
    Ok(ApiResponse::success(json!({ "reset": true })))
}
