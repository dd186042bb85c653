//! 产品服务（受保护资源）

use crate::{
    error::AppError,
    models::product::*,
    repository::ProductStore,
};
use std::sync::Arc;

pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i64) -> Result<Product, AppError> {
        validate_id(id)?;
        self.store.get(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        self.store.list().await
    }

    pub async fn create(&self, draft: ProductDraft) -> Result<Product, AppError> {
        validate_draft(&draft)?;

        let product = self.store.create(&draft).await?;
        tracing::info!(product_id = product.id, "Product created");

        Ok(product)
    }

    pub async fn update(&self, req: UpdateProductRequest) -> Result<Product, AppError> {
        validate_id(req.id)?;
        let draft = req.draft();
        validate_draft(&draft)?;

        let product = self
            .store
            .update(req.id, &draft)
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!(product_id = product.id, "Product updated");

        Ok(product)
    }

    pub async fn delete(&self, req: DeleteProductRequest) -> Result<Product, AppError> {
        validate_id(req.id)?;

        let product = self.store.delete(req.id).await?.ok_or(AppError::NotFound)?;
        tracing::info!(product_id = product.id, "Product deleted");

        Ok(product)
    }
}

fn validate_id(id: i64) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::BadRequest("id must be positive".to_string()));
    }
    Ok(())
}

fn validate_draft(draft: &ProductDraft) -> Result<(), AppError> {
    if draft.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if draft.description.trim().is_empty() {
        return Err(AppError::BadRequest("description must not be empty".to_string()));
    }
    if draft.value.is_nan() || draft.value <= 0.0 {
        return Err(AppError::BadRequest("value must be greater than zero".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryProductRepository;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryProductRepository::new()))
    }

    fn draft(name: &str, description: &str, value: f64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: description.to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service();

        let created = service.create(draft("widget", "a widget", 3.5)).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();

        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_drafts() {
        let service = service();

        for bad in [
            draft("", "desc", 1.0),
            draft("name", "  ", 1.0),
            draft("name", "desc", 0.0),
            draft("name", "desc", -4.0),
            draft("name", "desc", f64::NAN),
        ] {
            assert!(matches!(
                service.create(bad).await,
                Err(AppError::BadRequest(_))
            ));
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let service = service();

        assert!(matches!(service.get(5).await, Err(AppError::NotFound)));
        assert!(matches!(
            service.delete(DeleteProductRequest { id: 5 }).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            service
                .update(UpdateProductRequest {
                    id: 5,
                    name: "n".to_string(),
                    description: "d".to_string(),
                    value: 1.0,
                })
                .await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_non_positive_id_is_bad_request() {
        let service = service();

        assert!(matches!(service.get(0).await, Err(AppError::BadRequest(_))));
        assert!(matches!(
            service.delete(DeleteProductRequest { id: -1 }).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let service = service();
        let created = service.create(draft("widget", "a widget", 3.5)).await.unwrap();

        let updated = service
            .update(UpdateProductRequest {
                id: created.id,
                name: "gizmo".to_string(),
                description: "a gizmo".to_string(),
                value: 7.0,
            })
            .await
            .unwrap();
        assert_eq!(updated.name, "gizmo");

        let removed = service
            .delete(DeleteProductRequest { id: created.id })
            .await
            .unwrap();
        assert_eq!(removed, updated);
        assert!(service.list().await.unwrap().is_empty());
    }
}
