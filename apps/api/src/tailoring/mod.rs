// Tailoring pipeline: generate → extract claims → verify → score + flags.
// All model calls go through llm_client::invoker, never the API client directly.

pub mod error;
pub mod extractor;
pub mod flags;
pub mod generator;
pub mod handlers;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod scoring;
pub mod verifier;
