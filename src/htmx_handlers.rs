// src/htmx_handlers.rs

use axum::{
    Form,
    extract::{Path, Query, RawQuery, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::admin_lists::{category_list_page, product_list_page};
use crate::category_form::{
    CATEGORY_LIST_PATH, CategoryFormData, load_category_form, render_category_form, submit_category,
};
use crate::errors::AppError;
use crate::forms::{FormMode, LoadOutcome, SubmitOutcome};
use crate::htmx::{HtmxHeaders, Toast, is_htmx_request};
use crate::models::{CategoryContext, EntityId, ProductContext};
use crate::product_form::{
    PRODUCT_LIST_PATH, ProductFormData, load_category_options, load_product_form,
    render_category_select, render_product_form, submit_product,
};
use crate::response::{build_response, serve_full_page};
use crate::state::AppState;

fn page_headers(toast: Option<Toast>) -> HtmxHeaders {
    match toast {
        Some(toast) => HtmxHeaders::new().toast(toast),
        None => HtmxHeaders::new(),
    }
}

/// Turns a form load into a page, or into "notify and go back to the list".
async fn respond_with_form<F>(
    state: &AppState,
    headers: &HeaderMap,
    outcome: LoadOutcome<F>,
    render: fn(&F) -> Markup,
) -> Result<Response, AppError> {
    match outcome {
        LoadOutcome::Ready(form) => {
            build_response(headers, &state.shell_path, render(&form), HtmxHeaders::new()).await
        }
        LoadOutcome::Abandoned { toast, redirect } => {
            if is_htmx_request(headers) {
                Ok((
                    HtmxHeaders::new().toast(toast).navigate(redirect),
                    StatusCode::OK,
                )
                    .into_response())
            } else {
                abandoned_full_page(state, toast, redirect).await
            }
        }
    }
}

/// A full page load cannot follow `HX-Location`, so the list is served in
/// place with the message on top and the address bar rewritten to the list.
async fn abandoned_full_page(
    state: &AppState,
    toast: Toast,
    redirect: &'static str,
) -> Result<Response, AppError> {
    let (list, _) = if redirect == CATEGORY_LIST_PATH {
        category_list_page(state).await
    } else {
        product_list_page(state).await
    };
    let content = html! {
        div ."alert alert-danger" role="alert"
            "x-data"=""
            "x-init"=(format!("history.replaceState(null, '', '{}')", redirect))
        {
            (toast.message)
        }
        (list)
    };
    let page = serve_full_page(&state.shell_path, content).await?;
    Ok(Html(page).into_response())
}

/// Maps a submit result onto htmx: navigation on success, a re-rendered form
/// on validation errors, and a toast with the draft left alone on failure.
fn respond_to_submit<F>(outcome: SubmitOutcome<F>, render: fn(&F) -> Markup) -> Response {
    match outcome {
        SubmitOutcome::Saved { toast, redirect } => (
            HtmxHeaders::new().toast(toast).navigate(redirect),
            StatusCode::OK,
        )
            .into_response(),
        SubmitOutcome::Invalid { form, toast } => {
            (page_headers(toast), render(&form)).into_response()
        }
        SubmitOutcome::Failed { toast } => (
            HtmxHeaders::new().toast(toast).keep_content(),
            StatusCode::OK,
        )
            .into_response(),
    }
}

fn rejected_submission(rejection: FormRejection) -> Response {
    tracing::warn!("Malformed form submission: {}", rejection);
    (
        HtmxHeaders::new()
            .toast(Toast::error(format!("Erro ao salvar: {}", rejection.body_text())))
            .keep_content(),
        StatusCode::OK,
    )
        .into_response()
}

pub async fn index_handler() -> Redirect {
    Redirect::to(PRODUCT_LIST_PATH)
}

// --- CATEGORIES ---

pub async fn category_list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    tracing::info!("GET {}", CATEGORY_LIST_PATH);
    let (page, toast) = category_list_page(&state).await;
    build_response(&headers, &state.shell_path, page, page_headers(toast)).await
}

pub async fn new_category_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    tracing::info!("GET {}/new", CATEGORY_LIST_PATH);
    let context = CategoryContext::from_query(query.as_deref());
    let outcome = load_category_form(&state, FormMode::Create, context).await;
    respond_with_form(&state, &headers, outcome, render_category_form).await
}

pub async fn edit_category_form_handler(
    State(state): State<AppState>,
    Path(category_id): Path<EntityId>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    tracing::info!("GET {}/{}/edit", CATEGORY_LIST_PATH, category_id);
    let context = CategoryContext::from_query(query.as_deref());
    let outcome = load_category_form(&state, FormMode::Edit(category_id), context).await;
    respond_with_form(&state, &headers, outcome, render_category_form).await
}

pub async fn create_category_handler(
    State(state): State<AppState>,
    form: Result<Form<CategoryFormData>, FormRejection>,
) -> Response {
    tracing::info!("POST {} - create category", CATEGORY_LIST_PATH);
    match form {
        Ok(Form(data)) => respond_to_submit(
            submit_category(&state, FormMode::Create, data).await,
            render_category_form,
        ),
        Err(rejection) => rejected_submission(rejection),
    }
}

pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(category_id): Path<EntityId>,
    form: Result<Form<CategoryFormData>, FormRejection>,
) -> Response {
    tracing::info!("POST {}/{} - update category", CATEGORY_LIST_PATH, category_id);
    match form {
        Ok(Form(data)) => respond_to_submit(
            submit_category(&state, FormMode::Edit(category_id), data).await,
            render_category_form,
        ),
        Err(rejection) => rejected_submission(rejection),
    }
}

// --- PRODUCTS ---

pub async fn product_list_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    tracing::info!("GET {}", PRODUCT_LIST_PATH);
    let (page, toast) = product_list_page(&state).await;
    build_response(&headers, &state.shell_path, page, page_headers(toast)).await
}

pub async fn new_product_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    tracing::info!("GET {}/new", PRODUCT_LIST_PATH);
    let context = ProductContext::from_query(query.as_deref());
    let outcome = load_product_form(&state, FormMode::Create, context).await;
    respond_with_form(&state, &headers, outcome, render_product_form).await
}

pub async fn edit_product_form_handler(
    State(state): State<AppState>,
    Path(product_id): Path<EntityId>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    tracing::info!("GET {}/{}/edit", PRODUCT_LIST_PATH, product_id);
    let context = ProductContext::from_query(query.as_deref());
    let outcome = load_product_form(&state, FormMode::Edit(product_id), context).await;
    respond_with_form(&state, &headers, outcome, render_product_form).await
}

#[derive(Debug, Deserialize)]
pub struct CategoryOptionsParams {
    #[serde(default)]
    pub selected: String,
}

pub async fn category_options_handler(
    State(state): State<AppState>,
    Query(params): Query<CategoryOptionsParams>,
) -> impl IntoResponse {
    tracing::info!("GET category options (selected: '{}')", params.selected);
    let (options, toast) = load_category_options(&state).await;
    (
        page_headers(toast),
        render_category_select(&options, &params.selected, None),
    )
}

pub async fn create_product_handler(
    State(state): State<AppState>,
    form: Result<Form<ProductFormData>, FormRejection>,
) -> Response {
    tracing::info!("POST {} - create product", PRODUCT_LIST_PATH);
    match form {
        Ok(Form(data)) => respond_to_submit(
            submit_product(&state, FormMode::Create, data).await,
            render_product_form,
        ),
        Err(rejection) => rejected_submission(rejection),
    }
}

pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(product_id): Path<EntityId>,
    form: Result<Form<ProductFormData>, FormRejection>,
) -> Response {
    tracing::info!("POST {}/{} - update product", PRODUCT_LIST_PATH, product_id);
    match form {
        Ok(Form(data)) => respond_to_submit(
            submit_product(&state, FormMode::Edit(product_id), data).await,
            render_product_form,
        ),
        Err(rejection) => rejected_submission(rejection),
    }
}
