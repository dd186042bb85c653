//! User repository (凭据存储)

use crate::{
    error::AppError,
    models::user::{NewUser, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Credential storage used by the auth service.
///
/// `add` must persist the whole record atomically. Login lookup is an exact,
/// case-sensitive match; when duplicates exist the lowest id wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 保存新用户并返回分配了 id 的记录
    async fn add(&self, user: NewUser) -> Result<User, AppError>;

    /// 根据登录名查找用户
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError>;

    /// 存储健康检查
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Default)]
struct UserTable {
    users: BTreeMap<i64, User>,
    login_index: HashMap<String, Vec<i64>>,
    next_id: i64,
}

/// In-memory credential store
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
    enforce_unique_login: bool,
}

impl InMemoryUserRepository {
    pub fn new(enforce_unique_login: bool) -> Self {
        Self {
            table: RwLock::new(UserTable::default()),
            enforce_unique_login,
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserRepository {
    async fn add(&self, user: NewUser) -> Result<User, AppError> {
        // 整个插入在同一把写锁内完成
        let mut table = self.table.write().await;

        if self.enforce_unique_login && table.login_index.contains_key(&user.login) {
            return Err(AppError::LoginTaken);
        }

        table.next_id += 1;
        let id = table.next_id;
        let user = user.into_user(id);

        table
            .login_index
            .entry(user.login.clone())
            .or_default()
            .push(id);
        table.users.insert(id, user.clone());

        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let table = self.table.read().await;

        Ok(table
            .login_index
            .get(login)
            .and_then(|ids| ids.first())
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// PostgreSQL credential store
pub struct PgUserRepository {
    db: PgPool,
    enforce_unique_login: bool,
}

impl PgUserRepository {
    pub fn new(db: PgPool, enforce_unique_login: bool) -> Self {
        Self {
            db,
            enforce_unique_login,
        }
    }
}

#[async_trait]
impl CredentialStore for PgUserRepository {
    async fn add(&self, user: NewUser) -> Result<User, AppError> {
        let mut tx = self.db.begin().await?;

        if self.enforce_unique_login {
            // 同一登录名的并发创建在此串行化，事务结束时释放
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(&user.login)
                .execute(&mut *tx)
                .await?;

            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE login = $1)")
                    .bind(&user.login)
                    .fetch_one(&mut *tx)
                    .await?;

            if exists {
                return Err(AppError::LoginTaken);
            }
        }

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, display_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, login, display_name, password_hash
            "#,
        )
        .bind(&user.login)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, display_name, password_hash
            FROM users
            WHERE login = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
