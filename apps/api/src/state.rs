use std::sync::Arc;

use crate::render::DocumentRenderer;
use crate::storage::GenerationStore;
use crate::tailoring::pipeline::TailoringPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TailoringPipeline>,
    /// Postgres + S3 in production.
    pub store: Arc<dyn GenerationStore>,
    /// Redis render queue in production.
    pub renderer: Arc<dyn DocumentRenderer>,
}
