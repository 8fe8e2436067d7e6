use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::invoker::InvokeError;
use crate::tailoring::error::PipelineError;
use crate::tailoring::schema::FieldIssue;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// Every model variant failed. Usually an access, billing, or tier problem.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// No JSON could be recovered from the model's reply.
    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    /// Recovered JSON did not match the expected payload shape.
    #[error("Schema mismatch in {payload} output")]
    SchemaMismatch {
        payload: String,
        issues: Vec<FieldIssue>,
    },

    /// Generation store failure (Postgres row or S3 snapshot).
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput(msg) => AppError::Validation(msg),
            PipelineError::Exhausted(e @ InvokeError::Exhausted { .. }) => {
                AppError::ModelUnavailable(e.to_string())
            }
            PipelineError::Exhausted(e @ InvokeError::NoVariants) => {
                AppError::Internal(anyhow::anyhow!(e))
            }
            PipelineError::Recovery(e) => AppError::InvalidModelOutput(e.to_string()),
            PipelineError::Validation(e) => AppError::SchemaMismatch {
                payload: e.kind.to_string(),
                issues: e.issues,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
                None,
            ),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_UNAVAILABLE",
                    msg.clone(),
                    None,
                )
            }
            AppError::InvalidModelOutput(msg) => {
                tracing::error!("Invalid model output: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INVALID_MODEL_OUTPUT",
                    "The model returned output that could not be parsed".to_string(),
                    None,
                )
            }
            AppError::SchemaMismatch { payload, issues } => {
                tracing::error!("Schema mismatch in {payload} output: {issues:?}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SCHEMA_MISMATCH",
                    format!("The model's {payload} output did not match the expected schema"),
                    Some(json!(issues)),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::recovery::recover_json;
    use crate::llm_client::LlmError;
    use crate::tailoring::schema::validate_generation;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_schema_mismatch_surfaces_issues_verbatim() {
        let schema_err = validate_generation(json!({"tailoredResumeJson": {}}), false).unwrap_err();
        let expected = schema_err.issues.clone();
        let app_err = AppError::from(PipelineError::Validation(schema_err));

        let response = app_err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "SCHEMA_MISMATCH");
        assert_eq!(body["error"]["details"], json!(expected));
        assert!(body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i["path"] == "tailoredResumeJson.summary"));
    }

    #[tokio::test]
    async fn test_exhaustion_is_distinguishable() {
        let err = PipelineError::Exhausted(InvokeError::Exhausted {
            attempted: vec!["a".to_string(), "b".to_string()],
            last: LlmError::ModelUnavailable {
                model: "b".to_string(),
                message: "credit balance too low".to_string(),
            },
        });
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");
        assert!(body["error"]["message"].as_str().unwrap().contains("a, b"));
    }

    #[tokio::test]
    async fn test_recovery_failure_is_generic_to_caller() {
        let err = PipelineError::Recovery(recover_json("no json here").unwrap_err());
        let body = body_json(AppError::from(err).into_response()).await;
        assert_eq!(body["error"]["code"], "INVALID_MODEL_OUTPUT");
        assert!(!body["error"]["message"].as_str().unwrap().contains("no json here"));
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let err = PipelineError::InvalidInput("jobText cannot be empty".to_string());
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
