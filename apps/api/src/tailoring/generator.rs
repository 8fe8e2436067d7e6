//! Resume Generator: prompt → invoke → recover → validate → normalize links.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm_client::invoker::ModelInvoker;
use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::recovery::recover_json;
use crate::tailoring::error::PipelineError;
use crate::tailoring::models::{ClaimMapEntry, SuggestedAddition, TailoredResume};
use crate::tailoring::prompts::{
    COVER_LETTER_NOT_REQUESTED, COVER_LETTER_REQUESTED, GENERATION_PROMPT_TEMPLATE,
    GENERATION_SYSTEM,
};
use crate::tailoring::schema::validate_generation;

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub resume: TailoredResume,
    pub cover_letter: Option<String>,
    pub claim_map: Vec<ClaimMapEntry>,
    pub suggested_additions: Vec<SuggestedAddition>,
    /// Model variant that produced the output.
    pub model: String,
}

pub struct ResumeGenerator {
    invoker: Arc<ModelInvoker>,
}

impl ResumeGenerator {
    pub fn new(invoker: Arc<ModelInvoker>) -> Self {
        Self { invoker }
    }

    pub async fn generate(
        &self,
        job_text: &str,
        resume_text: &str,
        include_cover_letter: bool,
    ) -> Result<GenerationOutput, PipelineError> {
        let prompt = build_generation_prompt(job_text, resume_text, include_cover_letter);
        let system = format!("{GENERATION_SYSTEM} {JSON_ONLY_INSTRUCTION}");

        let invocation = self.invoker.invoke(&system, &prompt).await?;

        let value = recover_json(&invocation.text).map_err(|e| {
            warn!(
                "Generation output from '{}' was not JSON: {:?}",
                invocation.model, e.excerpt
            );
            e
        })?;

        let payload = validate_generation(value, include_cover_letter).map_err(|e| {
            warn!("Generation output failed validation: {:?}", e.issues);
            e
        })?;

        // Cosmetic only, and after validation so it cannot hide a bad payload.
        let mut resume = payload.tailored_resume_json;
        normalize_links(&mut resume);

        let cover_letter = if include_cover_letter {
            payload.cover_letter_text
        } else {
            None
        };

        info!(
            "Generated tailored resume: {} experience entries, {} projects, {} suggested additions",
            resume.experience.len(),
            resume.projects.len(),
            payload.suggested_additions.len()
        );

        Ok(GenerationOutput {
            resume,
            cover_letter,
            claim_map: payload.claim_map,
            suggested_additions: payload.suggested_additions,
            model: invocation.model,
        })
    }
}

fn build_generation_prompt(job_text: &str, resume_text: &str, include_cover_letter: bool) -> String {
    let cover_letter_instruction = if include_cover_letter {
        COVER_LETTER_REQUESTED
    } else {
        COVER_LETTER_NOT_REQUESTED
    };

    fill_template(
        GENERATION_PROMPT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("cover_letter_instruction", cover_letter_instruction),
            ("job_text", job_text),
            ("resume_text", resume_text),
        ],
    )
}

/// Prefixes `https://` onto link fields that carry no scheme.
pub fn normalize_links(resume: &mut TailoredResume) {
    let links = &mut resume.links;
    for link in [
        &mut links.linkedin,
        &mut links.github,
        &mut links.portfolio,
        &mut links.website,
    ] {
        *link = link.take().and_then(|url| normalize_url(&url));
    }
    for project in &mut resume.projects {
        project.url = project.url.take().and_then(|url| normalize_url(&url));
    }
}

/// Blank links are dropped.
fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains("://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}
