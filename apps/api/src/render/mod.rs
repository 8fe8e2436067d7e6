//! Rendering collaborator: hands documents to the external PDF renderer.
//!
//! The pipeline never renders. It pushes one job per document onto a Redis list
//! that the render worker consumes. Job ids are minted before the generation is
//! stored, and jobs are pushed only once the record exists.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

pub const RENDER_QUEUE_KEY: &str = "render:jobs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub job_id: String,
    pub generation_id: String,
    pub kind: DocumentKind,
    pub payload: Value,
}

impl RenderJob {
    pub fn new(generation_id: &str, kind: DocumentKind, payload: Value) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            generation_id: generation_id.to_string(),
            kind,
            payload,
        }
    }
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Queues a document for rendering under the job's pre-assigned id.
    async fn enqueue(&self, job: &RenderJob) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisRenderQueue {
    client: redis::Client,
}

impl RedisRenderQueue {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentRenderer for RedisRenderQueue {
    async fn enqueue(&self, job: &RenderJob) -> Result<()> {
        let body = serde_json::to_string(job).context("Failed to serialize render job")?;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")?;
        let depth: i64 = conn
            .rpush(RENDER_QUEUE_KEY, body)
            .await
            .context("Failed to enqueue render job")?;

        info!(
            "Queued {:?} render job {} for {} (queue depth {})",
            job.kind, job.job_id, job.generation_id, depth
        );
        Ok(())
    }
}
