// src/lib.rs

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod admin_lists;
pub mod api_client;
pub mod category_form;
pub mod config;
pub mod errors;
pub mod forms;
pub mod htmx;
pub mod htmx_handlers;
pub mod models;
pub mod product_form;
pub mod query_cache;
pub mod response;
pub mod services;
pub mod state;
pub mod submission;

use crate::api_client::RestCatalogClient;
use crate::config::AppConfig;
use crate::htmx_handlers::*;
use crate::query_cache::QueryCache;
use crate::state::AppState;
use crate::submission::SubmissionGuard;

/// Wires the REST catalog client, cache and guard from configuration.
pub fn build_state(config: &AppConfig) -> AppState {
    let client = Arc::new(RestCatalogClient::new(config.catalog_api_url.clone()));
    AppState {
        category_service: client.clone(),
        product_service: client,
        query_cache: QueryCache::new(config.cache_ttl),
        submissions: SubmissionGuard::new(),
        shell_path: config.shell_path.clone(),
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route(
            "/admin/categories",
            get(category_list_handler).post(create_category_handler),
        )
        .route("/admin/categories/new", get(new_category_form_handler))
        .route(
            "/admin/categories/{id}/edit",
            get(edit_category_form_handler),
        )
        .route("/admin/categories/{id}", post(update_category_handler))
        .route(
            "/admin/products",
            get(product_list_handler).post(create_product_handler),
        )
        .route("/admin/products/new", get(new_product_form_handler))
        .route(
            "/admin/products/category-options",
            get(category_options_handler),
        )
        .route("/admin/products/{id}/edit", get(edit_product_form_handler))
        .route("/admin/products/{id}", post(update_product_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
