// src/state.rs

use std::path::PathBuf;
use std::sync::Arc;

use crate::query_cache::QueryCache;
use crate::services::{CategoryService, ProductService};
use crate::submission::SubmissionGuard;

#[derive(Clone)]
pub struct AppState {
    pub category_service: Arc<dyn CategoryService>,
    pub product_service: Arc<dyn ProductService>,
    pub query_cache: QueryCache,
    pub submissions: SubmissionGuard,
    pub shell_path: PathBuf,
}
