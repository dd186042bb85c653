//! Product models (the protected resource)

use serde::{Deserialize, Serialize};

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub value: f64,
}

/// Product fields supplied by a caller
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub value: f64,
}

/// Update product request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductRequest {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub value: f64,
}

impl UpdateProductRequest {
    pub fn draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            value: self.value,
        }
    }
}

/// Delete product request
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteProductRequest {
    pub id: i64,
}

/// Product list response
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}
