// Grocery-side management: operational hours and the grocery's own products

use axum::{extract::State, Extension};

use super::Deleted;
use crate::database::models::{NewOperational, NewProduct, Operational, OperationalPatch, Product, ProductPatch};
use crate::error::ApiError;
use crate::extract::{JsonBody, RecordId};
use crate::handlers::validate::{require_non_negative, require_text, validate_days};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

fn check_hours(open: chrono::NaiveTime, close: chrono::NaiveTime) -> Result<(), ApiError> {
    if close <= open {
        return Err(ApiError::invalid_field("close", "must be later than open"));
    }
    Ok(())
}

/// POST /v1/groceries/operational
pub async fn create_operational(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<NewOperational>,
) -> ApiResult<Operational> {
    validate_days(&body.day_operational)?;
    check_hours(body.open, body.close)?;

    let operational = state.store.insert_operational(&user.username, &body).await?;
    Ok(ApiResponse::created(operational))
}

pub async fn list_operationals(State(state): State<AppState>) -> ApiResult<Vec<Operational>> {
    Ok(ApiResponse::success(state.store.list_operationals().await?))
}

pub async fn get_operational(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<Operational> {
    Ok(ApiResponse::success(state.store.get_operational(id).await?))
}

/// PUT /v1/groceries/operational/:id - `active` only changes when sent
pub async fn update_operational(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<OperationalPatch>,
) -> ApiResult<Operational> {
    if let Some(days) = &patch.day_operational {
        validate_days(days)?;
    }
    match (patch.open, patch.close) {
        (Some(open), Some(close)) => check_hours(open, close)?,
        (None, None) => {}
        (open, close) => {
            // One side changes, so the window is checked against the stored other side
            let stored = state.store.get_operational(id).await?;
            check_hours(open.unwrap_or(stored.open), close.unwrap_or(stored.close))?;
        }
    }

    let operational = state.store.update_operational(id, &user.username, &patch).await?;
    Ok(ApiResponse::success(operational))
}

pub async fn delete_operational(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_operational(id, &user.username).await?;
    Ok(ApiResponse::success(Deleted { deleted: id }))
}

/// POST /v1/groceries/products
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<NewProduct>,
) -> ApiResult<Product> {
    require_text("product_code", &body.product_code)?;
    require_text("product_name", &body.product_name)?;
    require_non_negative("quantity", body.quantity)?;
    require_non_negative("buy_price", body.buy_price)?;
    require_non_negative("min_retail_price", body.mrp)?;

    let product = state.store.insert_product(&user.username, &body).await?;
    Ok(ApiResponse::created(product))
}

/// GET /v1/groceries/products - the caller's own products
pub async fn list_own_products(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Product>> {
    Ok(ApiResponse::success(state.store.list_products_by_owner(&user.username).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<ProductPatch>,
) -> ApiResult<Product> {
    if let Some(code) = &patch.product_code {
        require_text("product_code", code)?;
    }
    if let Some(name) = &patch.product_name {
        require_text("product_name", name)?;
    }
    if let Some(quantity) = patch.quantity {
        require_non_negative("quantity", quantity)?;
    }
    if let Some(price) = patch.buy_price {
        require_non_negative("buy_price", price)?;
    }
    if let Some(price) = patch.mrp {
        require_non_negative("min_retail_price", price)?;
    }

    let product = state.store.update_product(id, &user.username, &patch).await?;
    Ok(ApiResponse::success(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_product(id, &user.username).await?;
    Ok(ApiResponse::success(Deleted { deleted: id }))
}
