//! Model Invoker: one pass through an ordered list of model variants.
//!
//! The first variant that returns non-empty text wins. There is no backoff and
//! no second pass: if every variant fails, the last failure is returned.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{LlmError, TextGenerator};

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("no model variants configured")]
    NoVariants,

    #[error("all model variants failed (tried: {}); last error: {last}", .attempted.join(", "))]
    Exhausted {
        attempted: Vec<String>,
        last: LlmError,
    },
}

/// Text returned by the winning variant.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub text: String,
    pub model: String,
}

pub struct ModelInvoker {
    generator: Arc<dyn TextGenerator>,
    variants: Vec<String>,
}

impl ModelInvoker {
    pub fn new(generator: Arc<dyn TextGenerator>, variants: Vec<String>) -> Self {
        Self {
            generator,
            variants,
        }
    }

    pub async fn invoke(&self, system: &str, prompt: &str) -> Result<Invocation, InvokeError> {
        let mut attempted = Vec::with_capacity(self.variants.len());
        let mut last: Option<LlmError> = None;

        for model in &self.variants {
            attempted.push(model.clone());

            match self.generator.complete(model, system, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!("Model variant '{}' succeeded", model);
                    return Ok(Invocation {
                        text,
                        model: model.clone(),
                    });
                }
                Ok(_) => {
                    warn!("Model variant '{}' returned empty content", model);
                    last = Some(LlmError::EmptyContent);
                }
                Err(e) => {
                    warn!("Model variant '{}' failed: {}", model, e);
                    last = Some(e);
                }
            }
        }

        match last {
            Some(last) => Err(InvokeError::Exhausted { attempted, last }),
            None => Err(InvokeError::NoVariants),
        }
    }
}
