// src/errors.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::htmx::{HtmxHeaders, Toast};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(String),

    #[error("Configuração inválida: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::Config(message) => {
                tracing::error!("Configuration error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro interno do servidor".to_string(),
                )
            }
        };

        let headers = HtmxHeaders::new().toast(Toast::error(message.clone()));
        (status, headers, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_carry_an_error_toast() {
        let response =
            AppError::InternalServerError("Erro ao montar a página".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let trigger = response.headers().get("HX-Trigger").unwrap().to_str().unwrap();
        let trigger: serde_json::Value = serde_json::from_str(trigger).unwrap();
        assert_eq!(trigger["showMessage"]["message"], "Erro ao montar a página");
        assert_eq!(trigger["showMessage"]["type"], "error");
    }

    #[test]
    fn config_details_are_not_sent_to_the_browser() {
        let response = AppError::Config("CATALOG_API_URL must be set".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let trigger = response.headers().get("HX-Trigger").unwrap().to_str().unwrap();
        assert!(!trigger.contains("CATALOG_API_URL"));
    }
}
