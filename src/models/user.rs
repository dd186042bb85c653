//! User domain models

use serde::Serialize;

/// Stored user record.
///
/// `password_hash` is only ever produced by the password hasher and is
/// redacted from `Debug` output.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub display_name: String,
    pub password_hash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("display_name", &self.display_name)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// User record before the store assigns an id
#[derive(Clone)]
pub struct NewUser {
    pub login: String,
    pub display_name: String,
    pub password_hash: String,
}

impl NewUser {
    /// Attach a store-assigned id
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            login: self.login,
            display_name: self.display_name,
            password_hash: self.password_hash,
        }
    }
}

/// Public view of a freshly created account
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub id: i64,
    pub login: String,
}

impl From<User> for CreateUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
        }
    }
}
