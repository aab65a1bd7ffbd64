// src/services.rs

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Category, CategoryPayload, EntityId, Product, ProductPayload};

/// Failure of a single catalog call. `message` is human-readable and is shown
/// to the operator verbatim.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ServiceError {
    pub status: Option<u16>,
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn get_category_by_id(&self, id: EntityId) -> Result<Category, ServiceError>;

    async fn get_all_categories(&self) -> Result<Vec<Category>, ServiceError>;

    async fn create_category(&self, data: &CategoryPayload) -> Result<Category, ServiceError>;

    async fn update_category(
        &self,
        id: EntityId,
        data: &CategoryPayload,
    ) -> Result<Category, ServiceError>;
}

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn get_all_products(&self) -> Result<Vec<Product>, ServiceError>;

    async fn create_product(&self, data: &ProductPayload) -> Result<Product, ServiceError>;

    async fn update_product(
        &self,
        id: EntityId,
        data: &ProductPayload,
    ) -> Result<Product, ServiceError>;
}
