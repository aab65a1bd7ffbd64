// src/api_client.rs

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::models::{Category, CategoryPayload, EntityId, Product, ProductPayload};
use crate::services::{CategoryService, ProductService, ServiceError};

const CONNECTION_ERROR_MESSAGE: &str = "Falha de conexão com o serviço de catálogo";
const DECODE_ERROR_MESSAGE: &str = "Resposta inválida do serviço de catálogo";

/// Client for the remote catalog REST service.
#[derive(Clone)]
pub struct RestCatalogClient {
    http: Client,
    base_url: Url,
}

impl RestCatalogClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, mut base_url: Url) -> Self {
        // Url::join drops the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url.join(path).map_err(|e| {
            tracing::error!("Invalid catalog endpoint '{}': {}", path, e);
            ServiceError::new(CONNECTION_ERROR_MESSAGE)
        })
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("Catalog request: {} {}", method, url);

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        match request.send().await {
            Ok(resp) => {
                if resp.status().is_success() {
                    resp.json::<T>().await.map_err(|e| {
                        tracing::error!("Failed to decode catalog response for {} {}: {}", method, url, e);
                        ServiceError::new(DECODE_ERROR_MESSAGE)
                    })
                } else {
                    Err(error_from_response(resp).await)
                }
            }
            Err(e) => {
                tracing::error!("Network error calling catalog {} {}: {:?}", method, url, e);
                Err(ServiceError::new(CONNECTION_ERROR_MESSAGE))
            }
        }
    }
}

/// Extracts the human-readable message from a failed response. The service
/// answers with `{"message": ...}` or `{"error": ...}`; anything else falls
/// back to the status reason.
async fn error_from_response(resp: Response) -> ServiceError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_owned))
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });

    tracing::warn!("Catalog service returned {}: {}", status, message);
    ServiceError::with_status(status.as_u16(), message)
}

fn entity_path(collection: &str, id: EntityId) -> String {
    let id = id.to_string();
    format!("{}/{}", collection, urlencoding::encode(&id))
}

#[async_trait]
impl CategoryService for RestCatalogClient {
    async fn get_category_by_id(&self, id: EntityId) -> Result<Category, ServiceError> {
        self.send::<(), _>(Method::GET, &entity_path("categories", id), None)
            .await
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>, ServiceError> {
        self.send::<(), _>(Method::GET, "categories", None).await
    }

    async fn create_category(&self, data: &CategoryPayload) -> Result<Category, ServiceError> {
        self.send(Method::POST, "categories", Some(data)).await
    }

    async fn update_category(
        &self,
        id: EntityId,
        data: &CategoryPayload,
    ) -> Result<Category, ServiceError> {
        self.send(Method::PUT, &entity_path("categories", id), Some(data))
            .await
    }
}

#[async_trait]
impl ProductService for RestCatalogClient {
    async fn get_all_products(&self) -> Result<Vec<Product>, ServiceError> {
        self.send::<(), _>(Method::GET, "products", None).await
    }

    async fn create_product(&self, data: &ProductPayload) -> Result<Product, ServiceError> {
        self.send(Method::POST, "products", Some(data)).await
    }

    async fn update_product(
        &self,
        id: EntityId,
        data: &ProductPayload,
    ) -> Result<Product, ServiceError> {
        self.send(Method::PUT, &entity_path("products", id), Some(data))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let client = RestCatalogClient::new(Url::parse("http://api.local/v1").unwrap());
        assert_eq!(
            client.endpoint("categories").unwrap().as_str(),
            "http://api.local/v1/categories"
        );
        assert_eq!(
            client.endpoint(&entity_path("products", 12)).unwrap().as_str(),
            "http://api.local/v1/products/12"
        );
    }
}
