//! 产品的 HTTP 处理器
//!
//! Every route here sits behind the JWT layer. The caller's identity is
//! available as `AuthContext` but products are not scoped per user.

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState, models::product::*,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 获取产品详情
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(user_id = auth_context.user_id, product_id = id, "Get product");

    let product = state.product_service.get(id).await?;

    Ok(Json(product))
}

/// 列出产品
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(user_id = auth_context.user_id, "List products");

    let products = state.product_service.list().await?;

    Ok(Json(ProductListResponse { products }))
}

/// 创建产品
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(draft): Json<ProductDraft>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(user_id = auth_context.user_id, "Create product");

    let product = state.product_service.create(draft).await?;

    Ok(Json(product))
}

/// 更新产品
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(user_id = auth_context.user_id, product_id = req.id, "Update product");

    let product = state.product_service.update(req).await?;

    Ok(Json(product))
}

/// 删除产品
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<DeleteProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(user_id = auth_context.user_id, product_id = req.id, "Delete product");

    let product = state.product_service.delete(req).await?;

    Ok(Json(product))
}
