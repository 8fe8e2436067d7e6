//! Structured-Output Recoverer: pulls one JSON value out of free model text.
//!
//! Order: first fenced code block → widest `{...}` span → whole trimmed text.
//! The first candidate that parses wins; later candidates are never tried.

use serde_json::Value;
use thiserror::Error;

/// Upper bound on raw model text carried in a recovery diagnostic.
pub const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Error)]
#[error("no JSON could be recovered from model output ({total_chars} chars, starts with {excerpt:?})")]
pub struct RecoveryError {
    pub excerpt: String,
    pub total_chars: usize,
}

pub fn recover_json(raw: &str) -> Result<Value, RecoveryError> {
    let candidates = [fenced_block(raw), brace_span(raw), Some(raw.trim())];

    for candidate in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
    }

    Err(RecoveryError {
        excerpt: raw.chars().take(EXCERPT_CHARS).collect(),
        total_chars: raw.chars().count(),
    })
}

/// Contents of the first ``` fence, with an optional `json` tag dropped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")? + 3;
    let rest = &text[open..];
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let close = rest.find("```")?;
    Some(rest[..close].trim())
}

/// From the first `{` to the last `}`, inclusive.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
