//! Tailoring pipeline: orchestrates one request end to end.
//!
//! Flow: validate input → generate → extract claims → verify → score + flags.
//!
//! Every stage is awaited in sequence on the caller's task. A verification
//! failure fails the whole request: an unverified resume is never returned.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::invoker::ModelInvoker;
use crate::tailoring::error::PipelineError;
use crate::tailoring::extractor::extract_bullets;
use crate::tailoring::flags::build_flags;
use crate::tailoring::generator::ResumeGenerator;
use crate::tailoring::models::{
    BulletVerification, ClaimMapEntry, ExtractedBullet, Flag, SuggestedAddition, TailoredResume,
};
use crate::tailoring::scoring::truth_score;
use crate::tailoring::verifier::BulletVerifier;

/// Request body for a tailoring run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoringRequest {
    pub job_text: String,
    pub resume_text: String,
    #[serde(default)]
    pub include_cover_letter: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Job text as sent to the model (after boundary truncation).
    pub job_text: String,
    pub resume: TailoredResume,
    pub cover_letter: Option<String>,
    pub claim_map: Vec<ClaimMapEntry>,
    pub suggested_additions: Vec<SuggestedAddition>,
    pub bullets: Vec<ExtractedBullet>,
    pub verifications: Vec<BulletVerification>,
    pub truth_score: u32,
    pub flags: Vec<Flag>,
    pub generation_model: String,
    pub verification_model: Option<String>,
}

pub struct TailoringPipeline {
    generator: ResumeGenerator,
    verifier: BulletVerifier,
    max_job_text_chars: usize,
}

impl TailoringPipeline {
    pub fn new(invoker: Arc<ModelInvoker>, max_job_text_chars: usize) -> Self {
        Self {
            generator: ResumeGenerator::new(invoker.clone()),
            verifier: BulletVerifier::new(invoker),
            max_job_text_chars,
        }
    }

    pub async fn run(&self, request: &TailoringRequest) -> Result<PipelineOutcome, PipelineError> {
        let job_text = check_input(request, self.max_job_text_chars)?;
        let resume_text = request.resume_text.trim();

        // Step 1: Generate
        let generation = self
            .generator
            .generate(&job_text, resume_text, request.include_cover_letter)
            .await?;

        // Step 2: Extract claims
        let bullets = extract_bullets(&generation.resume);
        info!("Extracted {} claims for verification", bullets.len());

        // Step 3: Verify
        let verification = self.verifier.verify(resume_text, &bullets).await?;

        // Step 4: Score + flags
        let score = truth_score(&verification.verifications);
        let flags = build_flags(&verification.verifications, &generation.suggested_additions);
        info!(
            "Truth score {}/100 with {} flags ({} verdicts)",
            score,
            flags.len(),
            verification.verifications.len()
        );

        Ok(PipelineOutcome {
            job_text,
            resume: generation.resume,
            cover_letter: generation.cover_letter,
            claim_map: generation.claim_map,
            suggested_additions: generation.suggested_additions,
            bullets,
            verifications: verification.verifications,
            truth_score: score,
            flags,
            generation_model: generation.model,
            verification_model: verification.model,
        })
    }
}

/// Rejects blank inputs before any model call; truncates overlong job text.
fn check_input(request: &TailoringRequest, max_job_text_chars: usize) -> Result<String, PipelineError> {
    let job_text = request.job_text.trim();
    if job_text.is_empty() {
        return Err(PipelineError::InvalidInput("jobText cannot be empty".to_string()));
    }
    if request.resume_text.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "resumeText cannot be empty".to_string(),
        ));
    }

    let total = job_text.chars().count();
    if total > max_job_text_chars {
        warn!(
            "jobText is {} chars, truncating to {}",
            total, max_job_text_chars
        );
        return Ok(job_text.chars().take(max_job_text_chars).collect());
    }
    Ok(job_text.to_string())
}
