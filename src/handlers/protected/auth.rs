use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_cookies::Cookies;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::handlers::validate::require_text;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::session::{self, expired_cookie};
use crate::state::AppState;

const ADMIN_GROUP: &str = "admin";

#[derive(Debug, Serialize)]
pub struct Me {
    pub username: String,
    pub groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddGroupsRequest {
    pub groups: Vec<String>,
    /// Defaults to the caller
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupsAdded {
    pub username: String,
    pub groups: Vec<String>,
}

/// GET /v1/auth/logout - drop the caller's session and expire the cookie
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    cookies: Cookies,
) -> ApiResult<Value> {
    session::terminate(&state, &user.username).await?;
    cookies.add(expired_cookie(state.settings.cookie_secure));
    Ok(ApiResponse::success(json!({ "logged_out": true })))
}

/// GET /v1/auth/me
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Me> {
    let groups = match user.groups {
        Some(groups) => groups,
        None => state.identity.list_groups_for_user(&user.username).await?,
    };
    Ok(ApiResponse::success(Me {
        username: user.username,
        groups,
    }))
}

/// GET /v1/auth/list-groups - every group in the user pool (admin only)
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let groups = state.identity.list_groups().await?;
    Ok(ApiResponse::success(groups))
}

/**
 * POST /v1/auth/add-user-groups - enrol a user into groups
 *
 * Input: `{"groups": ["grosir"], "username": "optional-other-user"}`
 *
 * Callers may add themselves to the self-service groups. Any other target
 * user or group needs `admin` membership. Memberships take effect on the
 * caller's next request; the session token is unchanged.
 */
pub async fn add_user_groups(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<AddGroupsRequest>,
) -> ApiResult<GroupsAdded> {
    if body.groups.is_empty() {
        return Err(ApiError::invalid_field("groups", "at least one group is required"));
    }
    for group in &body.groups {
        require_text("groups", group)?;
    }

    let target = body.username.unwrap_or_else(|| user.username.clone());
    let self_service = target == user.username
        && body
            .groups
            .iter()
            .all(|group| state.settings.self_service_groups.contains(group));

    if !self_service {
        let caller_groups = state.identity.list_groups_for_user(&user.username).await?;
        if !caller_groups.iter().any(|group| group == ADMIN_GROUP) {
            warn!("{} tried to enrol {} into {:?}", user.username, target, body.groups);
            return Err(ApiError::forbidden("Only admins may assign these groups"));
        }
    }

    for group in &body.groups {
        state.identity.add_user_to_group(&target, group).await?;
    }
    info!("Added {} to groups {:?}", target, body.groups);

    Ok(ApiResponse::success(GroupsAdded {
        username: target,
        groups: body.groups,
    }))
}
