// src/response.rs

use std::path::Path;

use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use lol_html::html_content::ContentType;
use lol_html::{HtmlRewriter, Settings, element};
use maud::Markup;
use tokio::fs;

use crate::errors::AppError;
use crate::htmx::{HtmxHeaders, is_htmx_request};

/// Reads the admin shell and injects the page content into `#admin-content`.
/// The shell's own `hx-get`/`hx-trigger` on that element are removed so htmx
/// does not load the content a second time.
pub async fn serve_full_page(shell_path: &Path, content_markup: Markup) -> Result<String, AppError> {
    let shell_content = fs::read(shell_path).await.map_err(|e| {
        tracing::error!("Cannot read admin shell {}: {}", shell_path.display(), e);
        AppError::InternalServerError("Erro ao carregar o modelo da página".to_string())
    })?;

    let content_string = content_markup.into_string();
    let mut response_body = Vec::new();

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("#admin-content", |el| {
                el.set_inner_content(&content_string, ContentType::Html);
                el.remove_attribute("hx-trigger");
                el.remove_attribute("hx-get");
                Ok(())
            })],
            ..Settings::default()
        },
        |c: &[u8]| response_body.extend_from_slice(c),
    );

    rewriter
        .write(&shell_content)
        .and_then(|_| rewriter.end())
        .map_err(|e| {
            tracing::error!("Failed to rewrite admin shell: {}", e);
            AppError::InternalServerError("Erro ao montar a página".to_string())
        })?;

    String::from_utf8(response_body).map_err(|e| {
        tracing::error!("Admin shell is not valid UTF-8: {}", e);
        AppError::InternalServerError("Erro ao montar a página".to_string())
    })
}

/// htmx requests get the fragment; full loads (F5, direct links) get the
/// fragment inside the shell page.
pub async fn build_response(
    request_headers: &HeaderMap,
    shell_path: &Path,
    page_content: Markup,
    htmx: HtmxHeaders,
) -> Result<Response, AppError> {
    if is_htmx_request(request_headers) {
        Ok((htmx, page_content).into_response())
    } else {
        let page = serve_full_page(shell_path, page_content).await?;
        Ok((htmx, Html(page)).into_response())
    }
}
