//! 认证服务：账户创建、登录

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    error::AppError,
    models::{auth::*, user::*},
    repository::CredentialStore,
};
use once_cell::sync::Lazy;
use std::sync::Arc;
use validator::Validate;

/// Hash verified when the login is unknown, so both failure paths cost one
/// Argon2 verification. Forced by [`AuthService::new`], never by a request.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| PasswordHasher::new().hash("timing-equalisation-only").ok());

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    dummy_hash: Option<String>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            store,
            jwt_service,
            hasher: PasswordHasher::new(),
            dummy_hash: DUMMY_HASH.clone(),
        }
    }

    /// 创建账户
    pub async fn create_account(
        &self,
        req: CreateUserRequest,
    ) -> Result<CreateUserResponse, AppError> {
        req.validate()?;

        let password_hash = self.hash_password(req.password).await?;

        let user = self
            .store
            .add(NewUser {
                login: req.login,
                display_name: req.display_name,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, login = %user.login, "Account created");

        Ok(CreateUserResponse::from(user))
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, AppError> {
        let Some(user) = self.store.find_by_login(&req.login).await? else {
            if let Some(dummy) = &self.dummy_hash {
                let _ = self.verify_password(req.password, dummy.clone()).await;
            }
            tracing::debug!("Login rejected");
            return Err(AppError::InvalidCredentials);
        };

        if !self
            .verify_password(req.password, user.password_hash.clone())
            .await?
        {
            tracing::debug!("Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.jwt_service.issue(&user)?;

        tracing::info!(user_id = user.id, "Login succeeded");

        Ok(TokenResponse {
            token,
            display_name: user.display_name,
        })
    }

    // Argon2 is deliberately slow; keep it off the async worker threads.
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }
}
