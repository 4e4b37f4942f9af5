// Product catalog: categories, size types and the shared product listing

use axum::{extract::State, Extension};

use super::Deleted;
use crate::database::models::{
    Category, CategoryPatch, NewCategory, NewSizeType, Product, SizeType, SizeTypePatch,
};
use crate::extract::{JsonBody, RecordId};
use crate::handlers::validate::require_text;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /v1/products - every product across groceries
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    Ok(ApiResponse::success(state.store.list_products().await?))
}

/// GET /v1/product/:id
pub async fn get_product(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<Product> {
    Ok(ApiResponse::success(state.store.get_product(id).await?))
}

/// POST /v1/products/category
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<NewCategory>,
) -> ApiResult<Category> {
    require_text("name", &body.name)?;
    let category = state.store.insert_category(&user.username, &body).await?;
    Ok(ApiResponse::created(category))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.store.list_categories().await?))
}

pub async fn get_category(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<Category> {
    Ok(ApiResponse::success(state.store.get_category(id).await?))
}

/// PUT /v1/products/category/:id - owner only, absent fields unchanged
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<CategoryPatch>,
) -> ApiResult<Category> {
    if let Some(name) = &patch.name {
        require_text("name", name)?;
    }
    let category = state.store.update_category(id, &user.username, &patch).await?;
    Ok(ApiResponse::success(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_category(id, &user.username).await?;
    Ok(ApiResponse::success(Deleted { deleted: id }))
}

/// POST /v1/products/size
pub async fn create_size_type(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<NewSizeType>,
) -> ApiResult<SizeType> {
    require_text("name", &body.name)?;
    let size_type = state.store.insert_size_type(&user.username, &body).await?;
    Ok(ApiResponse::created(size_type))
}

pub async fn list_size_types(State(state): State<AppState>) -> ApiResult<Vec<SizeType>> {
    Ok(ApiResponse::success(state.store.list_size_types().await?))
}

pub async fn get_size_type(State(state): State<AppState>, RecordId(id): RecordId) -> ApiResult<SizeType> {
    Ok(ApiResponse::success(state.store.get_size_type(id).await?))
}

pub async fn update_size_type(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<SizeTypePatch>,
) -> ApiResult<SizeType> {
    if let Some(name) = &patch.name {
        require_text("name", name)?;
    }
    let size_type = state.store.update_size_type(id, &user.username, &patch).await?;
    Ok(ApiResponse::success(size_type))
}

pub async fn delete_size_type(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RecordId(id): RecordId,
) -> ApiResult<Deleted> {
    state.store.delete_size_type(id, &user.username).await?;
    Ok(ApiResponse::success(Deleted { deleted: id }))
}
