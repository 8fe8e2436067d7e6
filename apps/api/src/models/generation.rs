use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GenerationRow {
    pub id: String,
    pub job_text: String,
    pub resume_text: String,
    pub include_cover_letter: bool,
    pub tailored_resume: Value,
    pub cover_letter_text: Option<String>,
    pub claim_map: Value,
    pub verifications: Value,
    pub truth_score: i32,
    pub flags: Value,
    pub suggested_additions: Value,
    pub generation_model: String,
    pub verification_model: Option<String>,
    pub resume_render_job_id: Option<String>,
    pub cover_letter_render_job_id: Option<String>,
    pub snapshot_s3_key: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
