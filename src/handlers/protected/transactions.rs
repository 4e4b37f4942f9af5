// Retail transactions. Every row is scoped to the calling customer.

use axum::{extract::State, Extension};
use tracing::info;

use super::Deleted;
use crate::database::models::{CartLine, CartLinePatch, Checkout, CheckoutPatch, NewCartLine, Order, OrderPatch};
use crate::error::ApiError;
use crate::extract::{JsonBody, RecordId};
use crate::handlers::validate::require_positive;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /v1/transactions/carts
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<NewCartLine>,
) -> ApiResult<CartLine> {
    require_positive("quantity", body.quantity)?;
    let line = state.store.insert_cart_line(&user.username, &body).await?;
    Ok(ApiResponse::created(line))
}

pub async fn list_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<CartLine>> {
    Ok(ApiResponse::success(state.store.list_cart_lines(&user.username).await?))
}

pub async fn get_cart_line(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<CartLine> {
    Ok(ApiResponse::success(state.store.get_cart_line(id, &user.username).await?))
}

pub async fn update_cart_line(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<CartLinePatch>,
) -> ApiResult<CartLine> {
    if let Some(quantity) = patch.quantity {
        require_positive("quantity", quantity)?;
    }
    let line = state.store.update_cart_line(id, &user.username, &patch).await?;
    Ok(ApiResponse::success(line))
}

pub async fn delete_cart_line(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_cart_line(id, &user.username).await?;
    Ok(ApiResponse::success(Deleted { deleted: id }))
}

/// POST /v1/transactions/checkout - total the caller's cart into a checkout row
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Checkout> {
    let checkout = state.store.create_checkout(&user.username).await?;
    info!("Checkout {} for {} totals {}", checkout.id, user.username, checkout.total_amount);
    Ok(ApiResponse::created(checkout))
}

pub async fn list_checkouts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Checkout>> {
    Ok(ApiResponse::success(state.store.list_checkouts(&user.username).await?))
}

pub async fn get_checkout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Checkout> {
    Ok(ApiResponse::success(state.store.get_checkout(id, &user.username).await?))
}

pub async fn update_checkout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<CheckoutPatch>,
) -> ApiResult<Checkout> {
    check_amount(patch.total_amount)?;
    let checkout = state.store.update_checkout(id, &user.username, &patch).await?;
    Ok(ApiResponse::success(checkout))
}

pub async fn delete_checkout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_checkout(id, &user.username).await?;
    Ok(ApiResponse::success(Deleted { deleted: id }))
}

/// POST /v1/transactions/orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Order> {
    let order = state.store.create_order(&user.username).await?;
    info!("Order {} for {} totals {}", order.id, user.username, order.total_amount);
    Ok(ApiResponse::created(order))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Order>> {
    Ok(ApiResponse::success(state.store.list_orders(&user.username).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Order> {
    Ok(ApiResponse::success(state.store.get_order(id, &user.username).await?))
}

pub async fn update_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<OrderPatch>,
) -> ApiResult<Order> {
    check_amount(patch.total_amount)?;
    let order = state.store.update_order(id, &user.username, &patch).await?;
    Ok(ApiResponse::success(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_order(id, &user.username).await?;
    Ok(ApiResponse::success(Deleted { deleted: id }))
}

fn check_amount(amount: Option<i64>) -> Result<(), ApiError> {
    match amount {
        Some(amount) if amount < 0 => Err(ApiError::invalid_field("total_amount", "must not be negative")),
        _ => Ok(()),
    }
}
