//! Pipeline data model.
//!
//! Everything here is created fresh per generation request and handed to
//! persistence as an immutable snapshot. Wire names are camelCase to match the
//! JSON contract the generator is prompted with.

use std::fmt;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Tailored resume (validated generator output)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredResume {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub links: ResumeLinks,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub projects: Vec<ProjectItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub tailoring: TailoringMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
    /// Validated non-empty.
    pub bullets: Vec<ResumeBullet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub bullets: Vec<ResumeBullet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub school: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

/// One resume bullet as written by the generator.
/// `evidence` is a snippet the generator claims comes from the original resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeBullet {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoringMeta {
    #[serde(default)]
    pub targeted_keywords: Vec<String>,
    #[serde(default)]
    pub matched_requirements: Vec<String>,
    #[serde(default)]
    pub unmatched_requirements: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Claim map and suggested additions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Summary,
    Experience,
    Projects,
    Education,
}

impl Section {
    pub const ALL: [&'static str; 4] = ["summary", "experience", "projects", "education"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Summary => "summary",
            Section::Experience => "experience",
            Section::Projects => "projects",
            Section::Education => "education",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit-only pairing of a bullet with its evidence. Not used by verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMapEntry {
    pub bullet_text: String,
    pub evidence: String,
    pub section: Section,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// A job requirement the original resume cannot support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAddition {
    pub requirement: String,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_bullet: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Extracted claims and verification
// ────────────────────────────────────────────────────────────────────────────

/// One addressable claim. `id` is `{section}_{item}_{bullet}` (or `summary_0`)
/// and is the join key between extraction and verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedBullet {
    pub id: String,
    pub text: String,
    pub section: Section,
    pub item_index: usize,
    pub bullet_index: usize,
    /// "Title at Company" or the project name; shown to the verifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Supported,
    Stretch,
    Unsupported,
}

impl VerificationStatus {
    pub const ALL: [&'static str; 3] = ["SUPPORTED", "STRETCH", "UNSUPPORTED"];
}

/// Evidence value meaning "nothing in the original resume supports this".
pub const NO_EVIDENCE: &str = "none";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletVerification {
    /// `None` only when the verdict could not be tied to any extracted bullet.
    pub bullet_id: Option<String>,
    pub bullet_text: String,
    pub section: Option<Section>,
    pub status: VerificationStatus,
    pub reason: String,
    pub evidence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Flags
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagStatus {
    Stretch,
    Unsupported,
    MissingRequirement,
}

/// User-facing record of one problematic claim or one unmet requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub bullet_id: Option<String>,
    pub bullet_text: Option<String>,
    pub status: FlagStatus,
    pub reason: String,
    pub evidence: String,
    pub suggested_fix: Option<String>,
    pub section: Option<Section>,
    pub requirement: Option<String>,
}
