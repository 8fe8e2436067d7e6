//! Claim Extractor: flattens a tailored resume into addressable claims.
//!
//! Order is fixed: summary, then experience entries, then projects. Identifiers
//! come from position only, so the same resume always yields the same ids.
//! Education is never flattened.

use crate::tailoring::models::{ExtractedBullet, ResumeBullet, Section, TailoredResume};

pub const SUMMARY_BULLET_ID: &str = "summary_0";

pub fn bullet_id(section: Section, item_index: usize, bullet_index: usize) -> String {
    match section {
        Section::Summary => SUMMARY_BULLET_ID.to_string(),
        _ => format!("{}_{}_{}", section.as_str(), item_index, bullet_index),
    }
}

pub fn extract_bullets(resume: &TailoredResume) -> Vec<ExtractedBullet> {
    let mut bullets = Vec::new();

    let summary = resume.summary.trim();
    if !summary.is_empty() {
        bullets.push(ExtractedBullet {
            id: SUMMARY_BULLET_ID.to_string(),
            text: summary.to_string(),
            section: Section::Summary,
            item_index: 0,
            bullet_index: 0,
            context: None,
        });
    }

    for (item_index, item) in resume.experience.iter().enumerate() {
        let context = format!("{} at {}", item.title, item.company);
        push_section(&mut bullets, Section::Experience, item_index, &item.bullets, &context);
    }

    for (item_index, item) in resume.projects.iter().enumerate() {
        push_section(&mut bullets, Section::Projects, item_index, &item.bullets, &item.name);
    }

    bullets
}

/// Blank bullets are skipped but still consume their index.
fn push_section(
    out: &mut Vec<ExtractedBullet>,
    section: Section,
    item_index: usize,
    bullets: &[ResumeBullet],
    context: &str,
) {
    for (bullet_index, bullet) in bullets.iter().enumerate() {
        let text = bullet.text.trim();
        if text.is_empty() {
            continue;
        }
        out.push(ExtractedBullet {
            id: bullet_id(section, item_index, bullet_index),
            text: text.to_string(),
            section,
            item_index,
            bullet_index,
            context: Some(context.to_string()),
        });
    }
}
