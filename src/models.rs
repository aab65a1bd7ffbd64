// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EntityId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    #[serde(default)]
    pub category_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// --- WRITE PAYLOADS SENT TO THE CATALOG SERVICE ---

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
}

/// Product body for create and update. `price` is always a JSON number.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductPayload {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub category_id: EntityId,
}

// --- NAVIGATION PAYLOADS ---
//
// The list pages attach the row entity to the edit navigation as nested
// query parameters (`category[name]=...`). They are decoded loosely and only
// become a context once every required field is present.

#[derive(Debug, Default, Deserialize)]
pub struct CategoryNavState {
    #[serde(default)]
    pub category: Option<CategoryNavFields>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryNavFields {
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductNavState {
    #[serde(default)]
    pub product: Option<ProductNavFields>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductNavFields {
    pub id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
}

/// Typed creation context for the category form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryContext {
    pub category: Option<Category>,
}

/// Typed creation context for the product form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductContext {
    pub product: Option<Product>,
}

impl From<CategoryNavState> for CategoryContext {
    fn from(state: CategoryNavState) -> Self {
        let category = state.category.and_then(|fields| {
            Some(Category {
                id: fields.id?,
                name: fields.name?,
                description: fields.description.filter(|d| !d.is_empty()),
                created_at: None,
            })
        });
        CategoryContext { category }
    }
}

impl From<ProductNavState> for ProductContext {
    fn from(state: ProductNavState) -> Self {
        let product = state.product.and_then(|fields| {
            Some(Product {
                id: fields.id?,
                title: fields.title?,
                description: fields.description?,
                price: fields.price?,
                image_url: fields.image_url?,
                // An empty or foreign category id means "not selected".
                category_id: fields.category_id.and_then(|c| c.trim().parse().ok()),
                created_at: None,
            })
        });
        ProductContext { product }
    }
}

/// Query string carrying a category as navigation payload. Brackets stay
/// literal so the nested form decodes without extra configuration.
pub fn category_navigation_query(category: &Category) -> String {
    let mut parts = vec![
        format!("category[id]={}", category.id),
        format!("category[name]={}", urlencoding::encode(&category.name)),
    ];
    if let Some(description) = &category.description {
        parts.push(format!(
            "category[description]={}",
            urlencoding::encode(description)
        ));
    }
    parts.join("&")
}

pub fn product_navigation_query(product: &Product) -> String {
    let mut parts = vec![
        format!("product[id]={}", product.id),
        format!("product[title]={}", urlencoding::encode(&product.title)),
        format!(
            "product[description]={}",
            urlencoding::encode(&product.description)
        ),
        format!("product[price]={}", product.price),
        format!(
            "product[image_url]={}",
            urlencoding::encode(&product.image_url)
        ),
    ];
    if let Some(category_id) = product.category_id {
        parts.push(format!("product[category_id]={}", category_id));
    }
    parts.join("&")
}

impl CategoryContext {
    /// Decodes a raw query string; anything that does not decode is treated
    /// as an absent payload.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.filter(|q| !q.is_empty()) {
            Some(query) => match serde_qs::from_str::<CategoryNavState>(query) {
                Ok(state) => state.into(),
                Err(e) => {
                    tracing::warn!("Ignoring undecodable category navigation payload: {}", e);
                    CategoryContext::default()
                }
            },
            None => CategoryContext::default(),
        }
    }
}

impl ProductContext {
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.filter(|q| !q.is_empty()) {
            Some(query) => match serde_qs::from_str::<ProductNavState>(query) {
                Ok(state) => state.into(),
                Err(e) => {
                    tracing::warn!("Ignoring undecodable product navigation payload: {}", e);
                    ProductContext::default()
                }
            },
            None => ProductContext::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_context_decodes_nested_query() {
        let ctx = CategoryContext::from_query(Some(
            "category[id]=7&category[name]=Camisas&category[description]=Algod%C3%A3o",
        ));
        let category = ctx.category.expect("category payload");
        assert_eq!(category.id, 7);
        assert_eq!(category.name, "Camisas");
        assert_eq!(category.description.as_deref(), Some("Algodão"));
    }

    #[test]
    fn incomplete_payload_is_ignored() {
        let ctx = CategoryContext::from_query(Some("category[name]=Sem+id"));
        assert!(ctx.category.is_none());

        let ctx = ProductContext::from_query(Some("product[id]=1&product[title]=Shirt"));
        assert!(ctx.product.is_none());
    }

    #[test]
    fn product_context_keeps_missing_category_as_unselected() {
        let ctx = ProductContext::from_query(Some(
            "product[id]=4&product[title]=Shirt&product[description]=Cotton&product[price]=19.99&product[image_url]=https%3A%2F%2Fx%2Fy.jpg&product[category_id]=",
        ));
        let product = ctx.product.expect("product payload");
        assert_eq!(product.price, 19.99);
        assert_eq!(product.category_id, None);
    }

    #[test]
    fn list_links_carry_a_decodable_product_payload() {
        let product = Product {
            id: 4,
            title: "Camisa & gravata".into(),
            description: "Linha 1\nLinha 2".into(),
            price: 59.9,
            image_url: "https://cdn.example.com/a b.jpg?w=200".into(),
            category_id: Some(2),
            created_at: None,
        };
        let query = product_navigation_query(&product);
        let ctx = ProductContext::from_query(Some(&query));
        assert_eq!(ctx.product, Some(product));
    }

    #[test]
    fn product_payload_serializes_price_as_number() {
        let payload = ProductPayload {
            title: "Shirt".into(),
            description: "Cotton shirt".into(),
            price: 19.99,
            image_url: "https://x/y.jpg".into(),
            category_id: 3,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["price"], serde_json::json!(19.99));
        assert_eq!(json["category_id"], serde_json::json!(3));
    }
}
