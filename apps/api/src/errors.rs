use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type shared by the pipeline, the JSON API and the HTML pages.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document format error: {0}")]
    DocumentFormat(String),

    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    #[error("Response parse error: {0}")]
    ResponseParse(String),

    #[error("File access error: {0}")]
    FileAccess(String),

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Serializable error payload, used both in HTTP error bodies and in per-artifact slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::DocumentFormat(_) => "DOCUMENT_FORMAT_ERROR",
            AppError::ModelInvocation(_) => "MODEL_INVOCATION_ERROR",
            AppError::ResponseParse(_) => "RESPONSE_PARSE_ERROR",
            AppError::FileAccess(_) => "FILE_ACCESS_ERROR",
            AppError::MissingPrerequisite(_) => "MISSING_PREREQUISITE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DocumentFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingPrerequisite(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ModelInvocation(_) | AppError::ResponseParse(_) => StatusCode::BAD_GATEWAY,
            AppError::FileAccess(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user: what went wrong and what to do about it.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::DocumentFormat(msg) => {
                format!("The uploaded file could not be read as a PDF ({msg}). Upload a valid PDF resume with at least one page.")
            }
            AppError::ModelInvocation(msg) => {
                format!("The language model request failed ({msg}). Check the API key and quota, then try again.")
            }
            AppError::ResponseParse(msg) => {
                format!("The language model returned an unusable response ({msg}). Try again.")
            }
            AppError::FileAccess(msg) => {
                format!("A required file could not be accessed ({msg}). Check the prompts and scratch directories.")
            }
            AppError::MissingPrerequisite(msg) => {
                format!("{msg}. Run the resume extraction first.")
            }
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.user_message(),
        }
    }

    /// Logs server-side failures; client mistakes are not worth an error line.
    pub fn log(&self) {
        match self {
            AppError::Validation(_) => tracing::debug!("{self}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => tracing::error!("{self}"),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Parse(_)
            | LlmError::EmptyContent
            | LlmError::Blocked(_)
            | LlmError::Stream(_) => {
                AppError::ResponseParse(e.to_string())
            }
            LlmError::Http(_) | LlmError::Api { .. } => AppError::ModelInvocation(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let ErrorBody { code, message } = self.body();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}
