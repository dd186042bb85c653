//! Product repository

use crate::{
    error::AppError,
    models::product::{Product, ProductDraft},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Product>, AppError>;

    /// 按 id 升序返回全部产品
    async fn list(&self) -> Result<Vec<Product>, AppError>;

    async fn create(&self, draft: &ProductDraft) -> Result<Product, AppError>;

    /// 更新产品，不存在时返回 None
    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Option<Product>, AppError>;

    /// 删除产品并返回被删除的记录
    async fn delete(&self, id: i64) -> Result<Option<Product>, AppError>;
}

#[derive(Default)]
struct ProductTable {
    products: BTreeMap<i64, Product>,
    next_id: i64,
}

/// In-memory product store
#[derive(Default)]
pub struct InMemoryProductRepository {
    table: RwLock<ProductTable>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductRepository {
    async fn get(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.table.read().await.products.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.table.read().await.products.values().cloned().collect())
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, AppError> {
        let mut table = self.table.write().await;

        table.next_id += 1;
        let product = Product {
            id: table.next_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            value: draft.value,
        };
        table.products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Option<Product>, AppError> {
        let mut table = self.table.write().await;

        Ok(table.products.get_mut(&id).map(|product| {
            product.name = draft.name.clone();
            product.description = draft.description.clone();
            product.value = draft.value;
            product.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self.table.write().await.products.remove(&id))
    }
}

/// PostgreSQL product store
pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductRepository {
    async fn get(&self, id: i64) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, value FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, value FROM products ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, value)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, value
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.value)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, description = $3, value = $4
            WHERE id = $1
            RETURNING id, name, description, value
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.value)
        .fetch_optional(&self.db)
        .await?;

        Ok(product)
    }

    async fn delete(&self, id: i64) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "DELETE FROM products WHERE id = $1 RETURNING id, name, description, value",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(product)
    }
}
