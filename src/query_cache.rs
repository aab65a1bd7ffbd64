// src/query_cache.rs

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::models::{Category, EntityId, Product};
use crate::services::{CategoryService, ProductService, ServiceError};

/// Cached catalog reads shared by all admin pages.
///
/// Concurrent loads of the same key are coalesced into one service call.
/// Writers invalidate the affected keys so the next view refetches.
#[derive(Clone)]
pub struct QueryCache {
    categories: Cache<(), Arc<Vec<Category>>>,
    category_details: Cache<EntityId, Category>,
    products: Cache<(), Arc<Vec<Product>>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            categories: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            category_details: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
            products: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn categories(
        &self,
        api: &dyn CategoryService,
    ) -> Result<Arc<Vec<Category>>, ServiceError> {
        if let Some(cached) = self.categories.get(&()).await {
            tracing::debug!("Cache HIT for category list");
            return Ok(cached);
        }
        tracing::debug!("Cache MISS for category list, fetching from catalog");

        self.categories
            .try_get_with((), async { api.get_all_categories().await.map(Arc::new) })
            .await
            .map_err(|e| (*e).clone())
    }

    /// The category list if it is already cached, without triggering a read.
    pub async fn cached_categories(&self) -> Option<Arc<Vec<Category>>> {
        self.categories.get(&()).await
    }

    pub async fn category(
        &self,
        api: &dyn CategoryService,
        id: EntityId,
    ) -> Result<Category, ServiceError> {
        if let Some(cached) = self.category_details.get(&id).await {
            tracing::debug!("Cache HIT for category {}", id);
            return Ok(cached);
        }
        tracing::debug!("Cache MISS for category {}, fetching from catalog", id);

        self.category_details
            .try_get_with(id, api.get_category_by_id(id))
            .await
            .map_err(|e| (*e).clone())
    }

    pub async fn products(
        &self,
        api: &dyn ProductService,
    ) -> Result<Arc<Vec<Product>>, ServiceError> {
        if let Some(cached) = self.products.get(&()).await {
            tracing::debug!("Cache HIT for product list");
            return Ok(cached);
        }
        tracing::debug!("Cache MISS for product list, fetching from catalog");

        self.products
            .try_get_with((), async { api.get_all_products().await.map(Arc::new) })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Drops the category list and, when given, the detail of one category.
    pub async fn invalidate_categories(&self, edited: Option<EntityId>) {
        self.categories.invalidate(&()).await;
        if let Some(id) = edited {
            self.category_details.invalidate(&id).await;
        }
        tracing::info!("Invalidated cached category list");
    }

    pub async fn invalidate_products(&self) {
        self.products.invalidate(&()).await;
        tracing::info!("Invalidated cached product list");
    }

    /// Invalidates the product list and refetches it when it was being
    /// served from the cache. A failed refetch is returned to the caller.
    pub async fn refresh_products(&self, api: &dyn ProductService) -> Result<(), ServiceError> {
        let was_cached = self.products.contains_key(&());
        self.invalidate_products().await;

        if was_cached {
            self.products(api).await?;
            tracing::info!("Refetched product list after invalidation");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryPayload, ProductPayload};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCatalog {
        category_reads: AtomicUsize,
        product_reads: AtomicUsize,
        fail_products: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl CategoryService for CountingCatalog {
        async fn get_category_by_id(&self, id: EntityId) -> Result<Category, ServiceError> {
            Ok(Category {
                id,
                name: format!("Categoria {}", id),
                description: None,
                created_at: None,
            })
        }

        async fn get_all_categories(&self) -> Result<Vec<Category>, ServiceError> {
            self.category_reads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![self.get_category_by_id(1).await?])
        }

        async fn create_category(&self, _: &CategoryPayload) -> Result<Category, ServiceError> {
            unreachable!()
        }

        async fn update_category(
            &self,
            _: EntityId,
            _: &CategoryPayload,
        ) -> Result<Category, ServiceError> {
            unreachable!()
        }
    }

    #[async_trait]
    impl ProductService for CountingCatalog {
        async fn get_all_products(&self) -> Result<Vec<Product>, ServiceError> {
            self.product_reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_products.load(Ordering::SeqCst) {
                return Err(ServiceError::new("lista indisponível"));
            }
            Ok(vec![])
        }

        async fn create_product(&self, _: &ProductPayload) -> Result<Product, ServiceError> {
            unreachable!()
        }

        async fn update_product(
            &self,
            _: EntityId,
            _: &ProductPayload,
        ) -> Result<Product, ServiceError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn category_list_is_fetched_once_until_invalidated() {
        let api = CountingCatalog::default();
        let cache = QueryCache::new(Duration::from_secs(60));

        cache.categories(&api).await.unwrap();
        cache.categories(&api).await.unwrap();
        assert_eq!(api.category_reads.load(Ordering::SeqCst), 1);

        cache.invalidate_categories(None).await;
        assert!(cache.cached_categories().await.is_none());
        cache.categories(&api).await.unwrap();
        assert_eq!(api.category_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_products_skips_refetch_when_list_was_never_loaded() {
        let api = CountingCatalog::default();
        let cache = QueryCache::new(Duration::from_secs(60));

        cache.refresh_products(&api).await.unwrap();
        assert_eq!(api.product_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_products_surfaces_refetch_failure() {
        let api = CountingCatalog::default();
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.products(&api).await.unwrap();

        api.fail_products.store(true, Ordering::SeqCst);
        let err = cache.refresh_products(&api).await.unwrap_err();
        assert_eq!(err.message, "lista indisponível");
        assert_eq!(api.product_reads.load(Ordering::SeqCst), 2);
    }
}
