//! Persistence collaborator: one immutable record per generation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tailoring::models::{
    BulletVerification, ClaimMapEntry, Flag, SuggestedAddition, TailoredResume,
};

pub mod postgres;

pub use postgres::PgGenerationStore;

/// Complete snapshot of one pipeline run. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub generation_id: String,
    pub job_text: String,
    pub resume_text: String,
    pub include_cover_letter: bool,
    pub tailored_resume: TailoredResume,
    pub cover_letter_text: Option<String>,
    pub claim_map: Vec<ClaimMapEntry>,
    pub verifications: Vec<BulletVerification>,
    pub truth_score: u32,
    pub flags: Vec<Flag>,
    pub suggested_additions: Vec<SuggestedAddition>,
    pub generation_model: String,
    pub verification_model: Option<String>,
    pub resume_render_job_id: Option<String>,
    pub cover_letter_render_job_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// `gen_<epoch-ms>_<8 random hex chars>`.
pub fn new_generation_id(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    format!("gen_{}_{}", now.timestamp_millis(), suffix)
}

#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn save(&self, record: &GenerationRecord) -> anyhow::Result<()>;

    async fn fetch(&self, generation_id: &str) -> anyhow::Result<Option<GenerationRecord>>;
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryGenerationStore {
        records: Mutex<HashMap<String, GenerationRecord>>,
    }

    impl InMemoryGenerationStore {
        pub fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationStore for InMemoryGenerationStore {
        async fn save(&self, record: &GenerationRecord) -> anyhow::Result<()> {
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&record.generation_id) {
                anyhow::bail!("generation {} already stored", record.generation_id);
            }
            records.insert(record.generation_id.clone(), record.clone());
            Ok(())
        }

        async fn fetch(&self, generation_id: &str) -> anyhow::Result<Option<GenerationRecord>> {
            Ok(self.records.lock().unwrap().get(generation_id).cloned())
        }
    }
}
