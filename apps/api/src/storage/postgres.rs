use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use sqlx::PgPool;
use tracing::info;

use crate::models::generation::GenerationRow;
use crate::storage::{GenerationRecord, GenerationStore};

/// Postgres row per generation plus a JSON snapshot object in S3.
/// CRITICAL: insert-only. Generation rows are never UPDATEd.
pub struct PgGenerationStore {
    pool: PgPool,
    s3: aws_sdk_s3::Client,
    s3_bucket: String,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool, s3: aws_sdk_s3::Client, s3_bucket: String) -> Self {
        Self {
            pool,
            s3,
            s3_bucket,
        }
    }
}

pub fn snapshot_key(generation_id: &str) -> String {
    format!("generations/{generation_id}.json")
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn save(&self, record: &GenerationRecord) -> Result<()> {
        let generation_id = &record.generation_id;
        let s3_key = snapshot_key(generation_id);

        // 1. Insert-only row, held in a transaction until the snapshot lands
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open generation transaction")?;

        sqlx::query(
            r#"
            INSERT INTO generations
                (id, job_text, resume_text, include_cover_letter, tailored_resume,
                 cover_letter_text, claim_map, verifications, truth_score, flags,
                 suggested_additions, generation_model, verification_model,
                 resume_render_job_id, cover_letter_render_job_id, snapshot_s3_key,
                 created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(generation_id)
        .bind(&record.job_text)
        .bind(&record.resume_text)
        .bind(record.include_cover_letter)
        .bind(serde_json::to_value(&record.tailored_resume)?)
        .bind(&record.cover_letter_text)
        .bind(serde_json::to_value(&record.claim_map)?)
        .bind(serde_json::to_value(&record.verifications)?)
        .bind(record.truth_score as i32)
        .bind(serde_json::to_value(&record.flags)?)
        .bind(serde_json::to_value(&record.suggested_additions)?)
        .bind(&record.generation_model)
        .bind(&record.verification_model)
        .bind(&record.resume_render_job_id)
        .bind(&record.cover_letter_render_job_id)
        .bind(&s3_key)
        .bind(record.created_at)
        .bind(record.completed_at)
        .execute(&mut *tx)
        .await
        .context("Failed to insert generation row")?;

        // 2. Full snapshot to S3. A failed upload drops the transaction, so no row survives.
        let body = serde_json::to_vec_pretty(record).context("Failed to serialize snapshot")?;
        self.s3
            .put_object()
            .bucket(&self.s3_bucket)
            .key(&s3_key)
            .body(ByteStream::from(body))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Uploaded generation snapshot to s3://{}/{}", self.s3_bucket, s3_key);

        tx.commit()
            .await
            .context("Failed to commit generation row")?;

        info!("Stored generation {}", generation_id);
        Ok(())
    }

    async fn fetch(&self, generation_id: &str) -> Result<Option<GenerationRecord>> {
        let row = sqlx::query_as::<_, GenerationRow>("SELECT * FROM generations WHERE id = $1")
            .bind(generation_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(record_from_row).transpose()
    }
}

fn record_from_row(row: GenerationRow) -> Result<GenerationRecord> {
    Ok(GenerationRecord {
        tailored_resume: serde_json::from_value(row.tailored_resume)
            .context("Stored tailored_resume is malformed")?,
        claim_map: serde_json::from_value(row.claim_map).context("Stored claim_map is malformed")?,
        verifications: serde_json::from_value(row.verifications)
            .context("Stored verifications are malformed")?,
        flags: serde_json::from_value(row.flags).context("Stored flags are malformed")?,
        suggested_additions: serde_json::from_value(row.suggested_additions)
            .context("Stored suggested_additions are malformed")?,
        truth_score: u32::try_from(row.truth_score).context("Stored truth_score is negative")?,
        generation_id: row.id,
        job_text: row.job_text,
        resume_text: row.resume_text,
        include_cover_letter: row.include_cover_letter,
        cover_letter_text: row.cover_letter_text,
        generation_model: row.generation_model,
        verification_model: row.verification_model,
        resume_render_job_id: row.resume_render_job_id,
        cover_letter_render_job_id: row.cover_letter_render_job_id,
        created_at: row.created_at,
        completed_at: row.completed_at,
    })
}
