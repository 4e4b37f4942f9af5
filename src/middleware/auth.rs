use axum::{
    extract::{MatchedPath, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{error, warn};

use super::policy::{AccessPolicy, PolicyTable};
use crate::cache::session_key;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller identity established by the session gate
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    /// Only fetched when the route's policy names groups
    pub groups: Option<Vec<String>>,
    pub token: String,
}

/// State for the gate: application handles plus the route policy table
#[derive(Clone)]
pub struct Gate {
    state: AppState,
    policies: Arc<PolicyTable>,
}

impl Gate {
    pub fn new(state: AppState, policies: PolicyTable) -> Self {
        Self {
            state,
            policies: Arc::new(policies),
        }
    }
}

/// Session gate for every protected route: bearer token, provider identity,
/// authoritative-session check, then the route's group requirement.
pub async fn session_gate(
    State(gate): State<Gate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let policy = route_policy(&gate.policies, &request)?;
    let user = authorize(&gate.state, request.headers(), policy).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn route_policy(policies: &PolicyTable, request: &Request) -> Result<AccessPolicy, ApiError> {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str())
        .unwrap_or_else(|| request.uri().path());

    policies.lookup(request.method(), path).ok_or_else(|| {
        error!("No access policy registered for {} {}", request.method(), path);
        ApiError::forbidden("Route is not open to any group")
    })
}

/// Every rejection returns before any later provider, cache or handler call
pub async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    policy: AccessPolicy,
) -> Result<AuthUser, ApiError> {
    let token = extract_bearer_token(headers).map_err(ApiError::unauthorized)?;

    let identity = state.identity.resolve_identity(token).await.map_err(|e| {
        warn!("Access token rejected by identity provider: {}", e);
        ApiError::unauthorized("Invalid or expired access token")
    })?;

    match state.sessions.get(&session_key(&identity.username)).await? {
        Some(current) if current.as_bytes() == token.as_bytes() => {}
        Some(_) => {
            warn!("Superseded session token presented for {}", identity.username);
            return Err(ApiError::unauthorized("Session has been replaced by a newer login"));
        }
        None => {
            return Err(ApiError::unauthorized("Session expired or logged out"));
        }
    }

    let groups = if policy.needs_groups() {
        let groups = state
            .identity
            .list_groups_for_user(&identity.username)
            .await
            .map_err(|e| {
                error!("Group lookup failed for {}: {}", identity.username, e);
                ApiError::upstream("Unable to verify group membership")
            })?;

        if !policy.permits(&groups) {
            warn!("{} lacks groups {:?}", identity.username, policy.required_groups());
            return Err(ApiError::forbidden(format!(
                "Requires membership in one of: {}",
                policy.required_groups().join(", ")
            )));
        }
        Some(groups)
    } else {
        None
    };

    Ok(AuthUser {
        username: identity.username,
        groups,
        token: token.to_string(),
    })
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err("Malformed bearer token");
    }
    Ok(token)
}
