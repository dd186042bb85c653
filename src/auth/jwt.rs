//! JWT token issuance and validation
//! HS256 tokens carrying a single subject claim (the user id)

use crate::{config::SigningConfig, error::AppError, models::user::User};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID, decimal string)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// Identity recovered from a validated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub user_id: i64,
}

/// JWT service
///
/// Built once from the process-wide [`SigningConfig`] and shared by the
/// login flow (issuing) and the access gate (validating).
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime: chrono::Duration,
}

impl JwtService {
    /// Create JWT service from signing config
    pub fn new(config: &SigningConfig) -> Result<Self, AppError> {
        config.validate()?;

        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime: config.lifetime(),
        })
    }

    /// Issue a token for the given user, valid from now
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        self.issue_at(user.id, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let expiration = issued_at.checked_add_signed(self.lifetime).ok_or_else(|| {
            tracing::error!("Token expiration overflows the supported time range");
            AppError::Internal("Token expiration out of range".to_string())
        })?;

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Validate signature, issuer, audience and expiry.
    ///
    /// Every failure collapses to [`AppError::Unauthenticated`]; the reason is
    /// only logged at debug level.
    pub fn validate(&self, token: &str) -> Result<Subject, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AppError::Unauthenticated
            })?
            .claims;

        let user_id = claims.sub.parse::<i64>().map_err(|_| {
            tracing::debug!("Token subject is not a user id");
            AppError::Unauthenticated
        })?;

        Ok(Subject { user_id })
    }

    /// Configured token lifetime
    pub fn lifetime(&self) -> chrono::Duration {
        self.lifetime
    }
}
