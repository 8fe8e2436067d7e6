//! Bullet Verifier: re-checks every extracted claim against the original resume.
//!
//! Classification itself is the model's judgment; this module owns the prompt,
//! the structural checks on the reply, and tying verdicts back to bullet ids.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::llm_client::invoker::ModelInvoker;
use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::recovery::recover_json;
use crate::tailoring::error::PipelineError;
use crate::tailoring::matching::{Candidate, MatcherChain};
use crate::tailoring::models::{BulletVerification, ExtractedBullet, NO_EVIDENCE};
use crate::tailoring::prompts::{VERIFICATION_PROMPT_TEMPLATE, VERIFICATION_SYSTEM};
use crate::tailoring::schema::{validate_verification, RawVerification};

#[derive(Debug, Clone, Default)]
pub struct VerificationOutput {
    pub verifications: Vec<BulletVerification>,
    /// `None` when there was nothing to verify and no model was called.
    pub model: Option<String>,
}

pub struct BulletVerifier {
    invoker: Arc<ModelInvoker>,
    matchers: MatcherChain,
}

impl BulletVerifier {
    pub fn new(invoker: Arc<ModelInvoker>) -> Self {
        Self {
            invoker,
            matchers: MatcherChain::default(),
        }
    }

    pub async fn verify(
        &self,
        resume_text: &str,
        bullets: &[ExtractedBullet],
    ) -> Result<VerificationOutput, PipelineError> {
        if bullets.is_empty() {
            info!("No claims extracted, skipping verification");
            return Ok(VerificationOutput::default());
        }

        let prompt = build_verification_prompt(resume_text, bullets);
        let system = format!("{VERIFICATION_SYSTEM} {JSON_ONLY_INSTRUCTION}");

        let invocation = self.invoker.invoke(&system, &prompt).await?;

        let value = recover_json(&invocation.text).map_err(|e| {
            warn!(
                "Verification output from '{}' was not JSON: {:?}",
                invocation.model, e.excerpt
            );
            e
        })?;

        let payload = validate_verification(value).map_err(|e| {
            warn!("Verification output failed validation: {:?}", e.issues);
            e
        })?;

        if payload.verifications.len() != bullets.len() {
            warn!(
                "Verifier returned {} verdicts for {} claims",
                payload.verifications.len(),
                bullets.len()
            );
        }

        let verifications: Vec<BulletVerification> = payload
            .verifications
            .into_iter()
            .enumerate()
            .map(|(position, raw)| self.associate(position, raw, bullets))
            .collect();

        let covered: HashSet<&str> = verifications
            .iter()
            .filter_map(|v| v.bullet_id.as_deref())
            .collect();
        let unverified: Vec<&str> = bullets
            .iter()
            .map(|b| b.id.as_str())
            .filter(|id| !covered.contains(id))
            .collect();
        if !unverified.is_empty() {
            warn!("Claims with no verdict: {:?}", unverified);
        }

        Ok(VerificationOutput {
            verifications,
            model: Some(invocation.model),
        })
    }

    /// Resolves the verdict's bullet and backfills text, section, and evidence.
    fn associate(
        &self,
        position: usize,
        raw: RawVerification,
        bullets: &[ExtractedBullet],
    ) -> BulletVerification {
        let candidate = Candidate {
            bullet_id: raw.bullet_id.as_deref(),
            bullet_text: &raw.bullet_text,
            position,
        };
        let matched = match self.matchers.resolve(&candidate, bullets) {
            Some((index, matcher)) => {
                debug!(
                    "Verdict {} matched bullet {} via {}",
                    position, bullets[index].id, matcher
                );
                Some(&bullets[index])
            }
            None => {
                warn!(
                    "Verdict {} could not be tied to any claim: {:?}",
                    position, raw.bullet_text
                );
                None
            }
        };

        let bullet_text = match matched {
            Some(bullet) if raw.bullet_text.trim().is_empty() => bullet.text.clone(),
            _ => raw.bullet_text,
        };
        let evidence = if raw.evidence.trim().is_empty() {
            NO_EVIDENCE.to_string()
        } else {
            raw.evidence
        };

        BulletVerification {
            bullet_id: matched.map(|b| b.id.clone()),
            bullet_text,
            section: matched.map(|b| b.section),
            status: raw.status,
            reason: raw.reason,
            evidence,
            suggested_fix: raw.suggested_fix.filter(|s| !s.trim().is_empty()),
        }
    }
}

fn build_verification_prompt(resume_text: &str, bullets: &[ExtractedBullet]) -> String {
    let listing = bullets
        .iter()
        .map(|b| match &b.context {
            Some(context) => format!("[{}] ({}: {}) {}", b.id, b.section, context, b.text),
            None => format!("[{}] ({}) {}", b.id, b.section, b.text),
        })
        .collect::<Vec<_>>()
        .join("\n");

    fill_template(
        VERIFICATION_PROMPT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("resume_text", resume_text),
            ("bullets", &listing),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::LlmError;
    use crate::tailoring::models::{Section, VerificationStatus};
    use serde_json::json;

    fn bullet(id: &str, text: &str, section: Section, context: Option<&str>) -> ExtractedBullet {
        ExtractedBullet {
            id: id.to_string(),
            text: text.to_string(),
            section,
            item_index: 0,
            bullet_index: 0,
            context: context.map(String::from),
        }
    }

    fn claims() -> Vec<ExtractedBullet> {
        vec![
            bullet("summary_0", "Growth-focused analyst.", Section::Summary, None),
            bullet(
                "experience_0_0",
                "Increased quarterly revenue by 15%",
                Section::Experience,
                Some("Analyst at Acme"),
            ),
            bullet(
                "experience_0_1",
                "Led a team of 12 engineers",
                Section::Experience,
                Some("Analyst at Acme"),
            ),
        ]
    }

    fn verifier_with(replies: Vec<Result<String, LlmError>>) -> (Arc<ScriptedGenerator>, BulletVerifier) {
        let scripted = Arc::new(ScriptedGenerator::new(replies));
        let invoker = ModelInvoker::new(scripted.clone(), vec!["verifier-model".to_string()]);
        (scripted, BulletVerifier::new(Arc::new(invoker)))
    }

    #[tokio::test]
    async fn test_empty_claim_list_skips_model_call() {
        let (scripted, verifier) = verifier_with(vec![]);
        let output = verifier.verify("resume", &[]).await.unwrap();
        assert!(output.verifications.is_empty());
        assert_eq!(output.model, None);
        assert!(scripted.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_lists_every_claim_with_context() {
        let reply = json!({"verifications": []}).to_string();
        let (scripted, verifier) = verifier_with(vec![Ok(reply)]);
        verifier.verify("ORIGINAL TEXT", &claims()).await.unwrap();

        let prompt = &scripted.calls()[0].prompt;
        assert!(prompt.contains("ORIGINAL TEXT"));
        assert!(prompt.contains("[summary_0] (summary) Growth-focused analyst."));
        assert!(prompt.contains(
            "[experience_0_0] (experience: Analyst at Acme) Increased quarterly revenue by 15%"
        ));
        assert!(prompt.contains("\"none\""));
    }

    #[test]
    fn test_placeholder_in_resume_text_is_not_expanded() {
        let prompt = build_verification_prompt("Skills: {bullets}", &claims());
        assert!(prompt.contains("Skills: {bullets}"));
        assert_eq!(prompt.matches("[experience_0_1]").count(), 1);
    }

    #[tokio::test]
    async fn test_reordered_and_drifted_verdicts_resolve_to_stable_ids() {
        let reply = json!({
            "verifications": [
                {"bulletText": "Led a team of 12 engineers.", "status": "UNSUPPORTED",
                 "reason": "No team size in resume", "evidence": "none",
                 "suggestedFix": "Collaborated with engineering"},
                {"bulletId": "experience_0_0", "bulletText": "Increased revenue", "status": "SUPPORTED",
                 "reason": "Stated directly", "evidence": "Increased quarterly revenue by 15% through campaign optimization"},
                {"bulletText": "Growth-focused analyst.", "status": "STRETCH",
                 "reason": "Broad", "evidence": "", "suggestedFix": ""}
            ]
        })
        .to_string();
        let (_, verifier) = verifier_with(vec![Ok(reply)]);
        let output = verifier.verify("resume", &claims()).await.unwrap();

        assert_eq!(output.model.as_deref(), Some("verifier-model"));
        let v = &output.verifications;
        assert_eq!(v[0].bullet_id.as_deref(), Some("experience_0_1"));
        assert_eq!(v[0].status, VerificationStatus::Unsupported);
        assert_eq!(v[0].evidence, "none");
        assert_eq!(v[1].bullet_id.as_deref(), Some("experience_0_0"));
        assert_eq!(v[1].section, Some(Section::Experience));
        assert_eq!(v[2].bullet_id.as_deref(), Some("summary_0"));
        assert_eq!(v[2].evidence, NO_EVIDENCE);
        assert_eq!(v[2].suggested_fix, None);
    }

    #[tokio::test]
    async fn test_missing_text_is_backfilled_from_position() {
        let reply = json!({
            "verifications": [
                {"status": "SUPPORTED", "reason": "ok", "evidence": "Growth"}
            ]
        })
        .to_string();
        let (_, verifier) = verifier_with(vec![Ok(reply)]);
        let output = verifier.verify("resume", &claims()).await.unwrap();

        assert_eq!(output.verifications.len(), 1);
        assert_eq!(output.verifications[0].bullet_id.as_deref(), Some("summary_0"));
        assert_eq!(output.verifications[0].bullet_text, "Growth-focused analyst.");
    }

    #[tokio::test]
    async fn test_surplus_verdicts_are_kept_unresolved() {
        let verdict = json!({"bulletText": "Unrelated claim", "status": "STRETCH", "reason": "r", "evidence": "none"});
        let reply = json!({"verifications": [verdict.clone(), verdict.clone(), verdict.clone(), verdict]}).to_string();
        let (_, verifier) = verifier_with(vec![Ok(reply)]);
        let output = verifier.verify("resume", &claims()).await.unwrap();

        assert_eq!(output.verifications.len(), 4);
        assert_eq!(output.verifications[2].bullet_id.as_deref(), Some("experience_0_1"));
        assert_eq!(output.verifications[3].bullet_id, None);
        assert_eq!(output.verifications[3].section, None);
    }

    #[tokio::test]
    async fn test_invalid_verdict_shape_is_a_validation_failure() {
        let reply = json!({"verifications": [{"status": "PROBABLY", "reason": "?"}]}).to_string();
        let (_, verifier) = verifier_with(vec![Ok(reply)]);
        match verifier.verify("resume", &claims()).await {
            Err(PipelineError::Validation(e)) => {
                let paths: Vec<_> = e.issues.iter().map(|i| i.path.as_str()).collect();
                assert_eq!(paths, vec!["verifications.0.status", "verifications.0.evidence"]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
