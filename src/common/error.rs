// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::banner::{self, Banner};
use crate::services::auth_context::Action;
use crate::services::wizard::WizardError;

/// Mensagens por campo, já achatadas (`origin.city`, `destinations[0].zip`).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid or missing authentication token")]
    InvalidToken,

    #[error("Missing permission {resource}:{action}")]
    Forbidden { resource: String, action: Action },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Wizard session not found")]
    SessionNotFound,

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("CAPTCHA token is required")]
    CaptchaMissing,

    // Resposta de erro da API REST principal. `banner` é o texto fixo da ação.
    #[error("{}", banner.as_deref().unwrap_or("Request to the server failed"))]
    Upstream {
        status: u16,
        detail: String,
        banner: Option<String>,
    },

    // Falha de transporte (DNS, timeout, conexão recusada...)
    #[error("{}", banner.as_deref().unwrap_or("Could not reach the server"))]
    Transport {
        source: reqwest::Error,
        banner: Option<String>,
    },

    #[error("Unexpected response from the server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{banner}")]
    PartialSave { banner: String, rolled_back: bool },

    #[error("Document generation failed: {0}")]
    Document(String),

    #[error("Uploaded image could not be read: {0}")]
    InvalidImage(String),

    #[error("The customer has no phone number on file")]
    MissingPhone,

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(source: reqwest::Error) -> Self {
        AppError::Transport { source, banner: None }
    }
}

impl AppError {
    /// Troca a mensagem técnica de uma falha de rede pelo banner da ação.
    pub fn with_banner(self, text: &str) -> Self {
        match self {
            AppError::Upstream { status, detail, .. } => AppError::Upstream {
                status,
                detail,
                banner: Some(text.to_string()),
            },
            AppError::Transport { source, .. } => AppError::Transport {
                source,
                banner: Some(text.to_string()),
            },
            AppError::Decode(e) => {
                tracing::warn!("Resposta inesperada da API: {}", e);
                AppError::Upstream {
                    status: 502,
                    detail: e.to_string(),
                    banner: Some(text.to_string()),
                }
            }
            other => other,
        }
    }
}

/// Achata `ValidationErrors` (inclusive structs e listas aninhadas) em `campo -> mensagens`.
pub fn flatten_validation_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    collect_errors("", errors, &mut out);
    out
}

fn collect_errors(prefix: &str, errors: &validator::ValidationErrors, out: &mut FieldErrors) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else if *field == "__all__" {
            prefix.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = list.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                out.entry(key).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(&format!("{}[{}]", key, index), inner, out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": flatten_validation_errors(&errors),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Wizard(WizardError::Blocked { tab, errors }) => {
                let body = Json(json!({
                    "error": "Please fix the highlighted fields before continuing.",
                    "tab": tab,
                    "details": errors,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Wizard(WizardError::InvalidEntry { errors }) => {
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": errors,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Wizard(ref e @ WizardError::LastDestination) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            AppError::Wizard(ref e @ WizardError::SubmitInProgress) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            AppError::Wizard(ref e @ WizardError::EntryNotFound { .. }) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::Wizard(ref e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Authentication token is invalid or missing.".to_string(),
            ),
            AppError::Forbidden { ref resource, action } => {
                tracing::warn!("Ação bloqueada: {}:{}", resource, action);
                (
                    StatusCode::FORBIDDEN,
                    format!("You do not have permission to {} {}.", action.verb(), resource),
                )
            }
            AppError::NotFound(ref what) => (StatusCode::NOT_FOUND, format!("{} not found.", what)),
            AppError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "This survey form is no longer open. Please reload it.".to_string(),
            ),
            AppError::CaptchaMissing => (
                StatusCode::BAD_REQUEST,
                "Please complete the CAPTCHA challenge.".to_string(),
            ),
            AppError::Upstream { status, ref detail, ref banner } => {
                tracing::warn!("API respondeu {}: {}", status, detail);
                let text = banner.clone().unwrap_or_else(|| banner::GENERIC_FAILURE.to_string());
                let code = match status {
                    400 => StatusCode::BAD_REQUEST,
                    404 => StatusCode::NOT_FOUND,
                    401 => StatusCode::UNAUTHORIZED,
                    403 => StatusCode::FORBIDDEN,
                    _ => StatusCode::BAD_GATEWAY,
                };
                return error_body(code, &text);
            }
            AppError::Transport { ref source, ref banner } => {
                tracing::warn!("Falha de transporte: {}", source);
                let text = banner.clone().unwrap_or_else(|| banner::GENERIC_FAILURE.to_string());
                return error_body(StatusCode::BAD_GATEWAY, &text);
            }
            AppError::Document(ref detail) => {
                tracing::error!("Falha ao gerar PDF: {}", detail);
                return error_body(StatusCode::INTERNAL_SERVER_ERROR, banner::GENERATE_PDF);
            }
            AppError::InvalidImage(ref detail) => {
                tracing::warn!("Imagem rejeitada: {}", detail);
                return error_body(StatusCode::BAD_REQUEST, "The page capture is not a valid PNG or JPEG image.");
            }
            AppError::MissingPhone => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The customer has no phone number to share with.".to_string(),
            ),
            AppError::PartialSave { ref banner, rolled_back } => {
                let body = Json(json!({
                    "error": banner,
                    "rolledBack": rolled_back,
                    "banner": Banner::error(banner),
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }

            // Todos os outros erros viram 500; o tracing loga a mensagem detalhada.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

fn error_body(status: StatusCode, text: &str) -> Response {
    let body = Json(json!({
        "error": text,
        "banner": Banner::error(text),
    }));
    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "City is required"))]
        city: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(nested)]
        origin: Inner,
    }

    #[test]
    fn flattens_nested_struct_errors_with_dotted_keys() {
        let outer = Outer { name: String::new(), origin: Inner { city: String::new() } };
        let errors = outer.validate().unwrap_err();
        let flat = flatten_validation_errors(&errors);

        assert_eq!(flat["name"], vec!["Name is required".to_string()]);
        assert_eq!(flat["origin.city"], vec!["City is required".to_string()]);
    }

    #[test]
    fn with_banner_replaces_upstream_message() {
        let err = AppError::Upstream { status: 500, detail: "boom".into(), banner: None }
            .with_banner(banner::SAVE_SURVEY);
        assert_eq!(err.to_string(), banner::SAVE_SURVEY);
    }

    async fn status_and_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn upstream_client_errors_keep_their_status() {
        for (upstream, expected) in [
            (400, StatusCode::BAD_REQUEST),
            (401, StatusCode::UNAUTHORIZED),
            (403, StatusCode::FORBIDDEN),
            (404, StatusCode::NOT_FOUND),
        ] {
            let err = AppError::Upstream { status: upstream, detail: "nope".into(), banner: None }
                .with_banner(banner::FETCH_BOOKING);
            let (status, body) = status_and_body(err).await;
            assert_eq!(status, expected);
            assert_eq!(body["error"], banner::FETCH_BOOKING);
        }
    }

    #[tokio::test]
    async fn other_upstream_failures_become_bad_gateway_with_banner() {
        let err = AppError::Upstream { status: 500, detail: "boom".into(), banner: None }
            .with_banner(banner::SAVE_SURVEY);
        let (status, body) = status_and_body(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], banner::SAVE_SURVEY);
        assert_eq!(body["banner"]["kind"], "error");
    }

    #[tokio::test]
    async fn submit_in_progress_is_a_conflict() {
        let (status, _) = status_and_body(AppError::Wizard(WizardError::SubmitInProgress)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
