use thiserror::Error;

use crate::llm_client::invoker::InvokeError;
use crate::llm_client::recovery::RecoveryError;
use crate::tailoring::schema::SchemaError;

/// Terminal failures of one tailoring request. Nothing here is retried; the
/// only fallback is the model-variant pass inside `ModelInvoker`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Exhausted(#[from] InvokeError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error(transparent)]
    Validation(#[from] SchemaError),
}
