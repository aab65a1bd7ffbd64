// src/admin_lists.rs

use std::collections::HashMap;

use maud::{Markup, html};

use crate::category_form::CATEGORY_LIST_PATH;
use crate::htmx::Toast;
use crate::models::{
    Category, EntityId, Product, category_navigation_query, product_navigation_query,
};
use crate::product_form::PRODUCT_LIST_PATH;
use crate::state::AppState;

fn format_price(price: f64) -> String {
    format!("R$ {:.2}", price).replace('.', ",")
}

/// Category list page plus an optional error toast when the read failed.
pub async fn category_list_page(state: &AppState) -> (Markup, Option<Toast>) {
    match state
        .query_cache
        .categories(state.category_service.as_ref())
        .await
    {
        Ok(categories) => (render_category_list(Some(categories.as_slice())), None),
        Err(e) => {
            tracing::error!("Failed to load category list: {}", e);
            (
                render_category_list(None),
                Some(Toast::error(format!(
                    "Erro ao carregar categorias: {}",
                    e.message
                ))),
            )
        }
    }
}

pub async fn product_list_page(state: &AppState) -> (Markup, Option<Toast>) {
    let products = state
        .query_cache
        .products(state.product_service.as_ref())
        .await;
    // Category names are only decoration here; a failed read leaves ids blank.
    let categories = state
        .query_cache
        .categories(state.category_service.as_ref())
        .await
        .ok();
    let names: HashMap<EntityId, String> = categories
        .iter()
        .flat_map(|list| list.iter())
        .map(|c| (c.id, c.name.clone()))
        .collect();

    match products {
        Ok(products) => (render_product_list(Some(products.as_slice()), &names), None),
        Err(e) => {
            tracing::error!("Failed to load product list: {}", e);
            (
                render_product_list(None, &names),
                Some(Toast::error(format!(
                    "Erro ao carregar produtos: {}",
                    e.message
                ))),
            )
        }
    }
}

fn edit_link(list_path: &str, id: EntityId, payload: &str) -> (String, String) {
    let path = format!("{}/{}/edit", list_path, id);
    (format!("{}?{}", path, payload), path)
}

pub fn render_category_list(categories: Option<&[Category]>) -> Markup {
    html! {
        div .card {
            div ."card-header text-bg-light d-flex justify-content-between align-items-center" {
                h2 .mb-0 { "Categorias" }
                button type="button" ."btn btn-primary"
                    hx-get=(format!("{}/new", CATEGORY_LIST_PATH))
                    hx-target="#admin-content"
                    hx-push-url="true"
                { "Nova Categoria" }
            }
            div .card-body {
                @match categories {
                    None => {
                        div ."alert alert-danger mb-0" { "Não foi possível carregar as categorias." }
                    }
                    Some([]) => {
                        p ."text-muted mb-0" { "Nenhuma categoria cadastrada." }
                    }
                    Some(categories) => {
                        table ."table table-hover align-middle mb-0" {
                            thead {
                                tr { th { "Nome" } th { "Descrição" } th {} }
                            }
                            tbody {
                                @for category in categories {
                                    @let (get_url, push_url) = edit_link(CATEGORY_LIST_PATH, category.id, &category_navigation_query(category));
                                    tr {
                                        td { (category.name) }
                                        td ."text-muted" { (category.description.as_deref().unwrap_or("")) }
                                        td .text-end {
                                            button type="button" ."btn btn-sm btn-outline-primary"
                                                hx-get=(get_url)
                                                hx-target="#admin-content"
                                                hx-push-url=(push_url)
                                            { "Editar" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_product_list(
    products: Option<&[Product]>,
    category_names: &HashMap<EntityId, String>,
) -> Markup {
    html! {
        div .card {
            div ."card-header text-bg-light d-flex justify-content-between align-items-center" {
                h2 .mb-0 { "Produtos" }
                button type="button" ."btn btn-success"
                    hx-get=(format!("{}/new", PRODUCT_LIST_PATH))
                    hx-target="#admin-content"
                    hx-push-url="true"
                { "Novo Produto" }
            }
            div .card-body {
                @match products {
                    None => {
                        div ."alert alert-danger mb-0" { "Não foi possível carregar os produtos." }
                    }
                    Some([]) => {
                        p ."text-muted mb-0" { "Nenhum produto cadastrado." }
                    }
                    Some(products) => {
                        table ."table table-hover align-middle mb-0" {
                            thead {
                                tr { th {} th { "Título" } th { "Categoria" } th { "Preço" } th {} }
                            }
                            tbody {
                                @for product in products {
                                    @let (get_url, push_url) = edit_link(PRODUCT_LIST_PATH, product.id, &product_navigation_query(product));
                                    tr {
                                        td {
                                            img .img-thumbnail src=(product.image_url) alt=(product.title)
                                                style="max-height: 48px" loading="lazy";
                                        }
                                        td { (product.title) }
                                        td {
                                            @if let Some(name) = product.category_id.and_then(|id| category_names.get(&id)) {
                                                (name)
                                            }
                                        }
                                        td { (format_price(product.price)) }
                                        td .text-end {
                                            button type="button" ."btn btn-sm btn-outline-primary"
                                                hx-get=(get_url)
                                                hx-target="#admin-content"
                                                hx-push-url=(push_url)
                                            { "Editar" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_buttons_carry_payload_but_push_clean_url() {
        let categories = vec![Category {
            id: 7,
            name: "Camisas".into(),
            description: Some("Algodão".into()),
            created_at: None,
        }];
        let html = render_category_list(Some(categories.as_slice())).into_string();
        assert!(html.contains("hx-get=\"/admin/categories/7/edit?category[id]=7&amp;category[name]=Camisas"));
        assert!(html.contains("hx-push-url=\"/admin/categories/7/edit\""));
    }

    #[test]
    fn prices_use_brazilian_format() {
        assert_eq!(format_price(19.99), "R$ 19,99");
        assert_eq!(format_price(5.0), "R$ 5,00");
    }

    #[test]
    fn failed_product_read_renders_alert() {
        let html = render_product_list(None, &HashMap::new()).into_string();
        assert!(html.contains("alert-danger"));
    }
}
