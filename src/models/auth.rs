//! Authentication-related models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create account request
#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64, message = "login must be 1-64 characters"))]
    pub login: String,
    #[validate(length(max = 128, message = "display_name must be at most 128 characters"))]
    pub display_name: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub display_name: String,
}
