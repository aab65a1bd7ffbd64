// src/forms.rs

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::htmx::Toast;
use crate::models::EntityId;

pub const DUPLICATE_SUBMISSION_MESSAGE: &str = "Salvamento já em andamento";

/// Create or edit, decided by the presence of an id in the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit(_))
    }

    pub fn id(&self) -> Option<EntityId> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(*id),
        }
    }
}

/// Per-field messages, keyed by the form control name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message in field order; used for the summary toast.
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Campo '{}' inválido", field));
                out.insert(field.to_string(), message);
            }
        }
        out
    }
}

/// Builds a `required` error carrying the operator-facing message.
pub fn required(message: &'static str) -> ValidationError {
    ValidationError::new("required").with_message(Cow::Borrowed(message))
}

/// Fails when the value is empty or whitespace only.
pub fn require_text(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(required(message))
    } else {
        Ok(())
    }
}

/// Result of one submit action, translated to htmx headers by the handlers.
#[derive(Debug)]
pub enum SubmitOutcome<F> {
    /// Write accepted: notify and leave the form.
    Saved { toast: Toast, redirect: &'static str },
    /// Validation failed: re-render the form with its errors, no write issued.
    Invalid { form: F, toast: Option<Toast> },
    /// Write (or the follow-up refresh) failed: notify, keep the draft on screen.
    Failed { toast: Toast },
}

/// Result of preparing a form for display.
#[derive(Debug)]
pub enum LoadOutcome<F> {
    Ready(F),
    /// The form cannot be shown; notify and go back to the list.
    Abandoned { toast: Toast, redirect: &'static str },
}
