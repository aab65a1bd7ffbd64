// src/category_form.rs

use maud::{Markup, html};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::forms::{
    DUPLICATE_SUBMISSION_MESSAGE, FieldErrors, FormMode, LoadOutcome, SubmitOutcome, require_text,
};
use crate::htmx::Toast;
use crate::models::{Category, CategoryContext, CategoryPayload};
use crate::query_cache::QueryCache;
use crate::services::{CategoryService, ServiceError};
use crate::state::AppState;

pub const CATEGORY_LIST_PATH: &str = "/admin/categories";
pub const NAME_REQUIRED_MESSAGE: &str = "O nome da categoria é obrigatório";

fn validate_name(name: &str) -> Result<(), ValidationError> {
    require_text(name, NAME_REQUIRED_MESSAGE)
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct CategoryDraft {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    pub description: String,
}

impl CategoryDraft {
    fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }

    /// Produces the initial draft from exactly one source. The navigation
    /// payload wins; otherwise the stored record is read by id. In edit mode
    /// a payload for a different id is ignored.
    pub async fn resolve(
        mode: FormMode,
        context: &CategoryContext,
        cache: &QueryCache,
        api: &dyn CategoryService,
    ) -> Result<Self, ServiceError> {
        let passed = context.category.as_ref().filter(|c| match mode {
            FormMode::Create => true,
            FormMode::Edit(id) => c.id == id,
        });

        match (mode, passed) {
            (_, Some(category)) => {
                tracing::debug!("Category draft initialised from navigation payload");
                Ok(Self::from_category(category))
            }
            (FormMode::Create, None) => Ok(Self::default()),
            (FormMode::Edit(id), None) => {
                let category = cache.category(api, id).await?;
                Ok(Self::from_category(&category))
            }
        }
    }

    pub fn to_payload(&self) -> Result<CategoryPayload, FieldErrors> {
        self.validate().map_err(FieldErrors::from)?;
        let description = self.description.trim();
        Ok(CategoryPayload {
            name: self.name.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }
}

/// Body posted by the category form.
#[derive(Debug, Deserialize)]
pub struct CategoryFormData {
    pub form_token: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<&CategoryFormData> for CategoryDraft {
    fn from(data: &CategoryFormData) -> Self {
        Self {
            name: data.name.clone(),
            description: data.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryForm {
    pub mode: FormMode,
    pub draft: CategoryDraft,
    pub errors: FieldErrors,
    pub form_token: Uuid,
}

impl CategoryForm {
    pub fn new(mode: FormMode, draft: CategoryDraft) -> Self {
        Self {
            mode,
            draft,
            errors: FieldErrors::new(),
            form_token: Uuid::new_v4(),
        }
    }
}

pub async fn load_category_form(
    state: &AppState,
    mode: FormMode,
    context: CategoryContext,
) -> LoadOutcome<CategoryForm> {
    match CategoryDraft::resolve(
        mode,
        &context,
        &state.query_cache,
        state.category_service.as_ref(),
    )
    .await
    {
        Ok(draft) => LoadOutcome::Ready(CategoryForm::new(mode, draft)),
        Err(e) => {
            tracing::error!("Failed to load category for {:?}: {}", mode, e);
            LoadOutcome::Abandoned {
                toast: Toast::error(format!("Erro ao carregar categoria: {}", e.message)),
                redirect: CATEGORY_LIST_PATH,
            }
        }
    }
}

pub async fn submit_category(
    state: &AppState,
    mode: FormMode,
    data: CategoryFormData,
) -> SubmitOutcome<CategoryForm> {
    let draft = CategoryDraft::from(&data);
    let payload = match draft.to_payload() {
        Ok(payload) => payload,
        Err(errors) => {
            tracing::info!("Category form rejected by validation: {:?}", errors);
            let toast = errors.first_message().map(Toast::error);
            let form = CategoryForm {
                mode,
                draft,
                errors,
                form_token: data.form_token,
            };
            return SubmitOutcome::Invalid { form, toast };
        }
    };

    let Some(_ticket) = state.submissions.try_begin(data.form_token) else {
        return SubmitOutcome::Failed {
            toast: Toast::error(DUPLICATE_SUBMISSION_MESSAGE),
        };
    };

    let api = state.category_service.as_ref();
    let result = match mode {
        FormMode::Create => api.create_category(&payload).await,
        FormMode::Edit(id) => api.update_category(id, &payload).await,
    };

    match result {
        Ok(saved) => {
            tracing::info!("Saved category {} ({:?})", saved.id, mode);
            state.query_cache.invalidate_categories(mode.id()).await;
            let message = if mode.is_edit() {
                "Categoria atualizada com sucesso!"
            } else {
                "Categoria criada com sucesso!"
            };
            SubmitOutcome::Saved {
                toast: Toast::success(message),
                redirect: CATEGORY_LIST_PATH,
            }
        }
        Err(e) => {
            tracing::error!("Failed to save category ({:?}): {}", mode, e);
            SubmitOutcome::Failed {
                toast: Toast::error(format!("Erro: {}", e.message)),
            }
        }
    }
}

fn form_action(mode: FormMode) -> String {
    match mode {
        FormMode::Create => CATEGORY_LIST_PATH.to_string(),
        FormMode::Edit(id) => format!("{}/{}", CATEGORY_LIST_PATH, id),
    }
}

pub fn render_category_form(form: &CategoryForm) -> Markup {
    let title = if form.mode.is_edit() {
        "Editar Categoria"
    } else {
        "Nova Categoria"
    };
    let name_error = form.errors.get("name");

    html! {
        div .row.justify-content-center {
            div ."col-md-8 col-lg-6" {
                div .card {
                    div ."card-header text-bg-light py-3" {
                        h2 ."card-title mb-0" { (title) }
                    }
                    div ."card-body p-4" {
                        form #category-form
                            hx-post=(form_action(form.mode))
                            hx-target="#admin-content"
                            hx-swap="innerHTML"
                            hx-disabled-elt="find button[type='submit']"
                        {
                            input type="hidden" name="form_token" value=(form.form_token);
                            div .mb-3 {
                                label for="name" .form-label { "Nome da Categoria *" }
                                input.form-control.is-invalid[name_error.is_some()]
                                    type="text" id="name" name="name" required
                                    value=(form.draft.name);
                                @if let Some(message) = name_error {
                                    div .invalid-feedback { (message) }
                                }
                            }
                            div .mb-4 {
                                label for="description" .form-label { "Descrição" }
                                textarea .form-control id="description" name="description" rows="3" {
                                    (form.draft.description)
                                }
                            }
                            div ."d-flex gap-2 mt-4" {
                                button type="submit" ."btn btn-primary" {
                                    span .htmx-indicator {
                                        span ."spinner-border spinner-border-sm me-2" role="status" aria-hidden="true" {}
                                        "Salvando..."
                                    }
                                    span .idle-label { "Salvar Categoria" }
                                }
                                button type="button" ."btn btn-outline-secondary"
                                    hx-get=(CATEGORY_LIST_PATH)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected_with_inline_message() {
        let draft = CategoryDraft {
            name: String::new(),
            description: "Qualquer".into(),
        };
        let errors = draft.to_payload().unwrap_err();
        assert_eq!(errors.get("name"), Some(NAME_REQUIRED_MESSAGE));
    }

    #[test]
    fn blank_description_is_sent_as_absent() {
        let draft = CategoryDraft {
            name: " Camisas ".into(),
            description: "   ".into(),
        };
        let payload = draft.to_payload().unwrap();
        assert_eq!(payload.name, "Camisas");
        assert_eq!(payload.description, None);
    }

    #[test]
    fn rendered_form_shows_inline_error_and_keeps_draft() {
        let mut form = CategoryForm::new(
            FormMode::Edit(3),
            CategoryDraft {
                name: String::new(),
                description: "Roupas de algodão".into(),
            },
        );
        form.errors.insert("name", NAME_REQUIRED_MESSAGE);

        let html = render_category_form(&form).into_string();
        assert!(html.contains("Editar Categoria"));
        assert!(html.contains("hx-post=\"/admin/categories/3\""));
        assert!(html.contains(NAME_REQUIRED_MESSAGE));
        assert!(html.contains("Roupas de algodão"));
        assert!(html.contains(&form.form_token.to_string()));
    }
}
