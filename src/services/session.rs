use tower_cookies::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use tower_cookies::Cookie;
use tracing::info;

use crate::cache::{session_key, SESSION_TTL};
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "access_token";

/// Make `access_token` the only valid session for its identity
pub async fn establish(state: &AppState, access_token: &str) -> Result<Identity, ApiError> {
    let identity = state.identity.resolve_identity(access_token).await?;
    state
        .sessions
        .set_with_expiry(&session_key(&identity.username), access_token, SESSION_TTL)
        .await?;

    info!("Session established for {}", identity.username);
    Ok(identity)
}

/// Drop the identity's session; later requests with its token fail the gate
pub async fn terminate(state: &AppState, username: &str) -> Result<(), ApiError> {
    state.sessions.delete(&session_key(username)).await?;
    info!("Session terminated for {}", username);
    Ok(())
}

/// Host-only cookie (no Domain attribute) carrying the access token
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(CookieDuration::seconds(SESSION_TTL.as_secs() as i64))
        .build()
}

pub fn expired_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(CookieDuration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}
