use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::errors::AppError;
use crate::render::{DocumentKind, RenderJob};
use crate::state::AppState;
use crate::storage::{new_generation_id, GenerationRecord};
use crate::tailoring::models::{
    BulletVerification, ClaimMapEntry, Flag, SuggestedAddition, TailoredResume,
};
use crate::tailoring::pipeline::TailoringRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsUsed {
    pub generation: String,
    pub verification: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentJobs {
    pub resume_job_id: Option<String>,
    pub cover_letter_job_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub generation_id: String,
    pub truth_score: u32,
    pub flags: Vec<Flag>,
    pub claim_map: Vec<ClaimMapEntry>,
    pub verifications: Vec<BulletVerification>,
    pub suggested_additions: Vec<SuggestedAddition>,
    pub tailored_resume: TailoredResume,
    pub cover_letter_text: Option<String>,
    pub models: ModelsUsed,
    pub documents: DocumentJobs,
}

impl From<GenerationRecord> for GenerationResponse {
    fn from(record: GenerationRecord) -> Self {
        Self {
            generation_id: record.generation_id,
            truth_score: record.truth_score,
            flags: record.flags,
            claim_map: record.claim_map,
            verifications: record.verifications,
            suggested_additions: record.suggested_additions,
            tailored_resume: record.tailored_resume,
            cover_letter_text: record.cover_letter_text,
            models: ModelsUsed {
                generation: record.generation_model,
                verification: record.verification_model,
            },
            documents: DocumentJobs {
                resume_job_id: record.resume_render_job_id,
                cover_letter_job_id: record.cover_letter_render_job_id,
            },
        }
    }
}

/// POST /api/v1/generations
///
/// Runs the full tailoring pipeline, stores the result, then queues rendering.
pub async fn handle_create_generation(
    State(state): State<AppState>,
    payload: Result<Json<TailoringRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let created_at = Utc::now();

    let outcome = state.pipeline.run(&req).await?;
    let generation_id = new_generation_id(created_at);

    let resume_payload = serde_json::to_value(&outcome.resume)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    let mut render_jobs = vec![RenderJob::new(
        &generation_id,
        DocumentKind::Resume,
        resume_payload,
    )];
    if let Some(text) = &outcome.cover_letter {
        render_jobs.push(RenderJob::new(
            &generation_id,
            DocumentKind::CoverLetter,
            json!({ "name": outcome.resume.name, "text": text }),
        ));
    }
    let job_id_for = |kind: DocumentKind| {
        render_jobs
            .iter()
            .find(|job| job.kind == kind)
            .map(|job| job.job_id.clone())
    };

    let record = GenerationRecord {
        generation_id: generation_id.clone(),
        job_text: outcome.job_text,
        resume_text: req.resume_text,
        include_cover_letter: req.include_cover_letter,
        tailored_resume: outcome.resume,
        cover_letter_text: outcome.cover_letter,
        claim_map: outcome.claim_map,
        verifications: outcome.verifications,
        truth_score: outcome.truth_score,
        flags: outcome.flags,
        suggested_additions: outcome.suggested_additions,
        generation_model: outcome.generation_model,
        verification_model: outcome.verification_model,
        resume_render_job_id: job_id_for(DocumentKind::Resume),
        cover_letter_render_job_id: job_id_for(DocumentKind::CoverLetter),
        created_at,
        completed_at: Utc::now(),
    };

    // Nothing is queued for a generation that failed to persist.
    state.store.save(&record).await.map_err(AppError::Storage)?;

    for job in &render_jobs {
        state.renderer.enqueue(job).await.map_err(|e| {
            error!(
                "Generation {} stored but {:?} render job {} was not queued: {e:?}",
                generation_id, job.kind, job.job_id
            );
            AppError::Internal(e)
        })?;
    }

    info!(
        "Generation {} complete (truth score {})",
        generation_id, record.truth_score
    );
    Ok(Json(record.into()))
}

/// GET /api/v1/generations/:id
pub async fn handle_get_generation(
    State(state): State<AppState>,
    Path(generation_id): Path<String>,
) -> Result<Json<GenerationResponse>, AppError> {
    let record = state
        .store
        .fetch(&generation_id)
        .await
        .map_err(AppError::Storage)?
        .ok_or_else(|| AppError::NotFound(format!("Generation {generation_id} not found")))?;
    Ok(Json(record.into()))
}
