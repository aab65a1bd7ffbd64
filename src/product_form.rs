// src/product_form.rs

use std::sync::Arc;

use maud::{Markup, html};
use serde::Deserialize;
use serde_json::json;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::forms::{
    DUPLICATE_SUBMISSION_MESSAGE, FieldErrors, FormMode, LoadOutcome, SubmitOutcome, require_text,
    required,
};
use crate::htmx::Toast;
use crate::models::{Category, EntityId, Product, ProductContext, ProductPayload};
use crate::state::AppState;

pub const PRODUCT_LIST_PATH: &str = "/admin/products";
pub const CATEGORY_OPTIONS_PATH: &str = "/admin/products/category-options";
pub const IMAGE_PLACEHOLDER_URL: &str = "https://placehold.co/400x300?text=Imagem+Inválida";

pub const TITLE_REQUIRED: &str = "O título é obrigatório";
pub const DESCRIPTION_REQUIRED: &str = "A descrição é obrigatória";
pub const PRICE_REQUIRED: &str = "O preço é obrigatório";
pub const PRICE_NOT_POSITIVE: &str = "O preço deve ser um número positivo";
pub const IMAGE_URL_REQUIRED: &str = "A URL da imagem é obrigatória";
pub const CATEGORY_REQUIRED: &str = "Selecione uma categoria";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ProductField {
    Title,
    Description,
    Price,
    ImageUrl,
    CategoryId,
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    require_text(value, TITLE_REQUIRED)
}

fn validate_description(value: &str) -> Result<(), ValidationError> {
    require_text(value, DESCRIPTION_REQUIRED)
}

fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    require_text(value, IMAGE_URL_REQUIRED)
}

fn validate_category_id(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<EntityId>() {
        Ok(_) => Ok(()),
        Err(_) => Err(required(CATEGORY_REQUIRED)),
    }
}

fn validate_price(value: &str) -> Result<(), ValidationError> {
    parse_price(value).map(|_| ())
}

/// Parses the price control's text. Empty input is "missing"; anything that
/// is not a finite number above zero is "not positive".
pub fn parse_price(value: &str) -> Result<f64, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(required(PRICE_REQUIRED));
    }
    match value.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(ValidationError::new("positive").with_message(PRICE_NOT_POSITIVE.into())),
    }
}

/// Product draft as typed into the form; every control is text.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProductDraft {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: String,
    #[validate(custom(function = "validate_image_url"))]
    pub image_url: String,
    #[validate(custom(function = "validate_category_id"))]
    pub category_id: String,
}

impl ProductDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image_url: product.image_url.clone(),
            category_id: product
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    /// Initial draft for a mode. Edit values come from the navigation payload
    /// only; a payload for another id is ignored.
    pub fn from_context(mode: FormMode, context: &ProductContext) -> Self {
        let passed = context.product.as_ref().filter(|p| match mode {
            FormMode::Create => true,
            FormMode::Edit(id) => p.id == id,
        });
        match passed {
            Some(product) => Self::from_product(product),
            None => {
                if let FormMode::Edit(id) = mode {
                    tracing::warn!(
                        "Product {} opened for edit without navigation payload, starting empty",
                        id
                    );
                }
                Self::default()
            }
        }
    }

    #[cfg(test)]
    pub fn field(&self, field: ProductField) -> &str {
        match field {
            ProductField::Title => &self.title,
            ProductField::Description => &self.description,
            ProductField::Price => &self.price,
            ProductField::ImageUrl => &self.image_url,
            ProductField::CategoryId => &self.category_id,
        }
    }

    #[cfg(test)]
    pub fn set_field(&mut self, field: ProductField, value: String) {
        match field {
            ProductField::Title => self.title = value,
            ProductField::Description => self.description = value,
            ProductField::Price => self.price = value,
            ProductField::ImageUrl => self.image_url = value,
            ProductField::CategoryId => self.category_id = value,
        }
    }

    /// Checks every field at once and builds the request body with the price
    /// coerced to a number. When the category list is known the selection
    /// must be one of its entries.
    pub fn to_payload(&self, known: Option<&[Category]>) -> Result<ProductPayload, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let category_id = self.category_id.trim().parse::<EntityId>().ok();
        if let (Some(id), Some(categories)) = (category_id, known) {
            if !categories.iter().any(|c| c.id == id) {
                errors.insert(ProductField::CategoryId.as_ref(), CATEGORY_REQUIRED);
            }
        }

        let price = parse_price(&self.price).ok();
        match (price, category_id) {
            (Some(price), Some(category_id)) if errors.is_empty() => Ok(ProductPayload {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                price,
                image_url: self.image_url.trim().to_string(),
                category_id,
            }),
            _ => Err(errors),
        }
    }
}

/// Draft plus its visible errors, as the operator edits it.
#[derive(Debug, Clone, Default)]
pub struct ProductFormState {
    pub draft: ProductDraft,
    pub errors: FieldErrors,
}

impl ProductFormState {
    /// Applies one edit and clears that field's error only. Mirrors the
    /// form's Alpine `@input` handlers.
    #[cfg(test)]
    pub fn edit(&mut self, field: ProductField, value: impl Into<String>) {
        self.draft.set_field(field, value.into());
        self.errors.clear(field.as_ref());
    }

    pub fn validate(&mut self, known: Option<&[Category]>) -> Option<ProductPayload> {
        match self.draft.to_payload(known) {
            Ok(payload) => {
                self.errors = FieldErrors::new();
                Some(payload)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }
}

/// Body posted by the product form.
#[derive(Debug, Deserialize)]
pub struct ProductFormData {
    pub form_token: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category_id: String,
}

impl From<&ProductFormData> for ProductDraft {
    fn from(data: &ProductFormData) -> Self {
        Self {
            title: data.title.clone(),
            description: data.description.clone(),
            price: data.price.clone(),
            image_url: data.image_url.clone(),
            category_id: data.category_id.clone(),
        }
    }
}

/// State of the category select.
#[derive(Debug, Clone)]
pub enum CategoryOptions {
    Loading,
    Loaded(Arc<Vec<Category>>),
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct ProductForm {
    pub mode: FormMode,
    pub state: ProductFormState,
    pub categories: CategoryOptions,
    pub form_token: Uuid,
}

pub async fn load_product_form(
    state: &AppState,
    mode: FormMode,
    context: ProductContext,
) -> LoadOutcome<ProductForm> {
    let draft = ProductDraft::from_context(mode, &context);
    // A warm cache fills the select right away; otherwise it loads lazily.
    let categories = match state.query_cache.cached_categories().await {
        Some(list) => CategoryOptions::Loaded(list),
        None => CategoryOptions::Loading,
    };
    LoadOutcome::Ready(ProductForm {
        mode,
        state: ProductFormState {
            draft,
            errors: FieldErrors::new(),
        },
        categories,
        form_token: Uuid::new_v4(),
    })
}

/// Reads the category list for the select. On failure the select is still
/// enabled but only offers the placeholder.
pub async fn load_category_options(state: &AppState) -> (CategoryOptions, Option<Toast>) {
    match state
        .query_cache
        .categories(state.category_service.as_ref())
        .await
    {
        Ok(list) => (CategoryOptions::Loaded(list), None),
        Err(e) => {
            tracing::error!("Failed to load categories for product form: {}", e);
            (
                CategoryOptions::Unavailable,
                Some(Toast::error(format!(
                    "Erro ao carregar categorias: {}",
                    e.message
                ))),
            )
        }
    }
}

pub async fn submit_product(
    state: &AppState,
    mode: FormMode,
    data: ProductFormData,
) -> SubmitOutcome<ProductForm> {
    let (categories, _) = load_category_options(state).await;
    let known = match &categories {
        CategoryOptions::Loaded(list) => Some(list.as_slice()),
        _ => None,
    };

    let mut form_state = ProductFormState {
        draft: ProductDraft::from(&data),
        errors: FieldErrors::new(),
    };
    let Some(payload) = form_state.validate(known) else {
        tracing::info!("Product form rejected by validation: {:?}", form_state.errors);
        let form = ProductForm {
            mode,
            state: form_state,
            categories,
            form_token: data.form_token,
        };
        return SubmitOutcome::Invalid { form, toast: None };
    };

    let Some(_ticket) = state.submissions.try_begin(data.form_token) else {
        return SubmitOutcome::Failed {
            toast: Toast::error(DUPLICATE_SUBMISSION_MESSAGE),
        };
    };

    let api = state.product_service.as_ref();
    match mode {
        FormMode::Create => match api.create_product(&payload).await {
            Ok(created) => {
                tracing::info!("Created product {}", created.id);
                state.query_cache.invalidate_products().await;
                SubmitOutcome::Saved {
                    toast: Toast::success("Produto criado com sucesso!"),
                    redirect: PRODUCT_LIST_PATH,
                }
            }
            Err(e) => {
                tracing::error!("Failed to create product: {}", e);
                SubmitOutcome::Failed {
                    toast: Toast::error(format!("Erro ao criar produto: {}", e.message)),
                }
            }
        },
        FormMode::Edit(id) => match api.update_product(id, &payload).await {
            Ok(_) => {
                tracing::info!("Updated product {}", id);
                // The list must be fresh before the operator is sent back to it.
                match state.query_cache.refresh_products(api).await {
                    Ok(()) => SubmitOutcome::Saved {
                        toast: Toast::success("Produto atualizado com sucesso!"),
                        redirect: PRODUCT_LIST_PATH,
                    },
                    Err(e) => {
                        tracing::error!("Product list refresh failed after update: {}", e);
                        SubmitOutcome::Failed {
                            toast: Toast::error(format!(
                                "Erro ao atualizar lista de produtos: {}",
                                e.message
                            )),
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to update product {}: {}", id, e);
                SubmitOutcome::Failed {
                    toast: Toast::error(format!("Erro ao atualizar produto: {}", e.message)),
                }
            }
        },
    }
}

fn form_action(mode: FormMode) -> String {
    match mode {
        FormMode::Create => PRODUCT_LIST_PATH.to_string(),
        FormMode::Edit(id) => format!("{}/{}", PRODUCT_LIST_PATH, id),
    }
}

/// Alpine state for the form: the preview URL and one error slot per field.
fn alpine_state(form: &ProductForm) -> String {
    let errors: serde_json::Map<String, serde_json::Value> = ProductField::iter()
        .map(|field| {
            let message = form.state.errors.get(field.as_ref()).unwrap_or("");
            (field.to_string(), json!(message))
        })
        .collect();
    json!({
        "imageUrl": form.state.draft.image_url,
        "errors": errors,
    })
    .to_string()
}

fn clear_error(field: ProductField) -> String {
    format!("errors.{} = ''", field)
}

fn invalid_binding(field: ProductField) -> String {
    format!("{{ 'is-invalid': errors.{} }}", field)
}

/// Inline message slot. Must directly follow its control so Bootstrap's
/// `.is-invalid ~ .invalid-feedback` rule shows it.
fn field_feedback(field: ProductField, message: Option<&str>) -> Markup {
    let name = field.as_ref();
    html! {
        div .invalid-feedback
            "x-show"=(format!("errors.{}", name))
            "x-text"=(format!("errors.{}", name))
        {
            (message.unwrap_or(""))
        }
    }
}

fn error_feedback(form: &ProductForm, field: ProductField) -> Markup {
    field_feedback(field, form.state.errors.get(field.as_ref()))
}

/// The category select. While loading it is disabled and asks the server
/// for the populated version.
pub fn render_category_select(
    options: &CategoryOptions,
    selected: &str,
    error: Option<&str>,
) -> Markup {
    let field = ProductField::CategoryId;
    let loading = matches!(options, CategoryOptions::Loading);
    let load_url = format!(
        "{}?selected={}",
        CATEGORY_OPTIONS_PATH,
        urlencoding::encode(selected)
    );

    html! {
        div #category-select
            hx-get=[loading.then(|| load_url.clone())]
            hx-trigger=[loading.then_some("load")]
            hx-swap=[loading.then_some("outerHTML")]
        {
            select.form-select.is-invalid[error.is_some()]
                id="category_id" name="category_id"
                disabled[loading]
                "x-bind:class"=(invalid_binding(field))
                "@change"=(clear_error(field))
            {
                option value="" { "Selecione uma categoria..." }
                @if let CategoryOptions::Loaded(categories) = options {
                    @for category in categories.iter() {
                        @let value = category.id.to_string();
                        option value=(value) selected[value == selected.trim()] { (category.name) }
                    }
                }
            }
            (field_feedback(field, error))
            @if loading {
                div .form-text {
                    span ."spinner-border spinner-border-sm me-2" role="status" aria-hidden="true" {}
                    "Carregando categorias..."
                }
            }
        }
    }
}

pub fn render_product_form(form: &ProductForm) -> Markup {
    let draft = &form.state.draft;
    let errors = &form.state.errors;
    let title = if form.mode.is_edit() {
        "Alterar Produto"
    } else {
        "Novo Produto"
    };
    let has_error = |field: ProductField| errors.get(field.as_ref()).is_some();

    html! {
        div .row.justify-content-center {
            div .col-md-8 {
                div .card "x-data"=(alpine_state(form)) {
                    div ."card-header text-bg-light" {
                        h2 .mb-0 { (title) }
                    }
                    div .card-body {
                        form #product-form
                            hx-post=(form_action(form.mode))
                            hx-target="#admin-content"
                            hx-swap="innerHTML"
                            hx-disabled-elt="find button[type='submit']"
                        {
                            input type="hidden" name="form_token" value=(form.form_token);

                            div .mb-3 {
                                label for="title" .form-label { "Título" }
                                input.form-control.is-invalid[has_error(ProductField::Title)]
                                    type="text" id="title" name="title" autofocus
                                    value=(draft.title)
                                    "x-bind:class"=(invalid_binding(ProductField::Title))
                                    "@input"=(clear_error(ProductField::Title));
                                (error_feedback(form, ProductField::Title))
                            }
                            div .mb-3 {
                                label for="description" .form-label { "Descrição" }
                                textarea.form-control.is-invalid[has_error(ProductField::Description)]
                                    id="description" name="description" rows="3"
                                    "x-bind:class"=(invalid_binding(ProductField::Description))
                                    "@input"=(clear_error(ProductField::Description))
                                {
                                    (draft.description)
                                }
                                (error_feedback(form, ProductField::Description))
                            }
                            div .mb-3 {
                                label for="category_id" .form-label { "Categoria" }
                                (render_category_select(
                                    &form.categories,
                                    &draft.category_id,
                                    errors.get(ProductField::CategoryId.as_ref()),
                                ))
                            }
                            div .mb-3 {
                                label for="price" .form-label { "Preço (R$)" }
                                input.form-control.is-invalid[has_error(ProductField::Price)]
                                    type="number" step="0.01" id="price" name="price"
                                    value=(draft.price)
                                    "x-bind:class"=(invalid_binding(ProductField::Price))
                                    "@input"=(clear_error(ProductField::Price));
                                (error_feedback(form, ProductField::Price))
                            }
                            div .mb-3 {
                                label for="image_url" .form-label { "URL da Imagem" }
                                input.form-control.is-invalid[has_error(ProductField::ImageUrl)]
                                    type="url" id="image_url" name="image_url"
                                    placeholder="https://exemplo.com/imagem.jpg"
                                    value=(draft.image_url)
                                    "x-model"="imageUrl"
                                    "x-bind:class"=(invalid_binding(ProductField::ImageUrl))
                                    "@input"=(clear_error(ProductField::ImageUrl));
                                (error_feedback(form, ProductField::ImageUrl))
                                div .form-text {
                                    "Insira a URL completa de uma imagem disponível na internet"
                                }
                            }

                            template "x-if"="imageUrl" {
                                div ."mb-3 text-start" {
                                    label .form-label { "Pré-visualização" }
                                    div {
                                        img .img-thumbnail
                                            "x-bind:src"="imageUrl"
                                            alt="Pré-visualização"
                                            style="max-height: 200px"
                                            onerror=(format!("this.onerror=null;this.src='{}';", IMAGE_PLACEHOLDER_URL));
                                    }
                                }
                            }

                            div .d-flex {
                                button type="submit" ."btn btn-success me-2" {
                                    span .htmx-indicator {
                                        span ."spinner-border spinner-border-sm me-2" role="status" aria-hidden="true" {}
                                        "Salvando..."
                                    }
                                    span .idle-label { "Salvar Produto" }
                                }
                                button type="button" ."btn btn-secondary"
                                    hx-get=(PRODUCT_LIST_PATH)
                                    hx-target="#admin-content"
                                    hx-push-url="true"
                                {
                                    "Cancelar"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
