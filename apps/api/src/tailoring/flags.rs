//! Flag Synthesizer: the user-facing list of what needs attention.
//!
//! Verdict flags (STRETCH/UNSUPPORTED, in verdict order) come first, then one
//! MISSING_REQUIREMENT flag per suggested addition, in their order.

use crate::tailoring::models::{
    BulletVerification, Flag, FlagStatus, SuggestedAddition, VerificationStatus, NO_EVIDENCE,
};

pub fn build_flags(
    verifications: &[BulletVerification],
    additions: &[SuggestedAddition],
) -> Vec<Flag> {
    verifications
        .iter()
        .filter_map(verdict_flag)
        .chain(additions.iter().map(missing_requirement_flag))
        .collect()
}

fn verdict_flag(v: &BulletVerification) -> Option<Flag> {
    let status = match v.status {
        VerificationStatus::Supported => return None,
        VerificationStatus::Stretch => FlagStatus::Stretch,
        VerificationStatus::Unsupported => FlagStatus::Unsupported,
    };
    Some(Flag {
        bullet_id: v.bullet_id.clone(),
        bullet_text: Some(v.bullet_text.clone()),
        status,
        reason: v.reason.clone(),
        evidence: v.evidence.clone(),
        suggested_fix: v.suggested_fix.clone(),
        section: v.section,
        requirement: None,
    })
}

fn missing_requirement_flag(addition: &SuggestedAddition) -> Flag {
    Flag {
        bullet_id: None,
        bullet_text: None,
        status: FlagStatus::MissingRequirement,
        reason: addition.rationale.clone(),
        evidence: NO_EVIDENCE.to_string(),
        suggested_fix: addition.suggested_bullet.clone(),
        section: None,
        requirement: Some(addition.requirement.clone()),
    }
}
