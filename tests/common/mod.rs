//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use product_service::{
    auth::JwtService,
    config::SigningConfig,
    middleware::AppState,
    repository::{InMemoryProductRepository, InMemoryUserRepository},
    routes,
};
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";
pub const TEST_ISSUER: &str = "product-service-test";
pub const TEST_AUDIENCE: &str = "product-clients-test";

/// 创建测试签名配置
pub fn create_signing_config() -> SigningConfig {
    SigningConfig {
        secret: Secret::new(TEST_SECRET.to_string()),
        issuer: TEST_ISSUER.to_string(),
        audience: TEST_AUDIENCE.to_string(),
        expiration_hours: 1.0,
    }
}

/// 创建使用内存存储的测试应用状态
pub fn create_test_app_state() -> Arc<AppState> {
    let jwt_service =
        Arc::new(JwtService::new(&create_signing_config()).expect("Failed to create JWT service"));

    Arc::new(AppState::new(
        Arc::new(InMemoryUserRepository::new(true)),
        Arc::new(InMemoryProductRepository::new()),
        jwt_service,
    ))
}

pub fn create_test_app() -> (Router, Arc<AppState>) {
    let state = create_test_app_state();
    (routes::create_router(state.clone()), state)
}

/// 发送 JSON 请求
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// 读取响应体为 JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 创建账户并登录，返回令牌
pub async fn register_and_login(app: &Router, login: &str, password: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/auth",
        None,
        Some(serde_json::json!({
            "login": login,
            "display_name": login,
            "password": password,
        })),
    )
    .await;
    assert!(response.status().is_success());

    let response = send_json(
        app,
        "POST",
        "/auth/login",
        None,
        Some(serde_json::json!({ "login": login, "password": password })),
    )
    .await;
    assert!(response.status().is_success());

    body_json(response).await["token"]
        .as_str()
        .expect("token should be a string")
        .to_string()
}
