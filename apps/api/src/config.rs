use anyhow::{bail, Context, Result};

pub const DEFAULT_MODEL_VARIANTS: &str =
    "claude-sonnet-4-5,claude-3-7-sonnet-latest,claude-3-5-haiku-latest";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Tried in order, first success wins.
    pub model_variants: Vec<String>,
    pub max_output_tokens: u32,
    pub max_job_text_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            model_variants: parse_model_variants(
                &std::env::var("MODEL_VARIANTS")
                    .unwrap_or_else(|_| DEFAULT_MODEL_VARIANTS.to_string()),
            )?,
            max_output_tokens: u32::try_from(parse_positive(
                "MAX_OUTPUT_TOKENS",
                &std::env::var("MAX_OUTPUT_TOKENS").unwrap_or_else(|_| "8192".to_string()),
            )?)
            .context("MAX_OUTPUT_TOKENS is too large")?,
            max_job_text_chars: parse_positive(
                "MAX_JOB_TEXT_CHARS",
                &std::env::var("MAX_JOB_TEXT_CHARS").unwrap_or_else(|_| "12000".to_string()),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Comma-separated, order preserved, blanks and duplicates dropped.
pub fn parse_model_variants(raw: &str) -> Result<Vec<String>> {
    let mut variants: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !variants.iter().any(|v| v == name) {
            variants.push(name.to_string());
        }
    }
    if variants.is_empty() {
        bail!("MODEL_VARIANTS must name at least one model");
    }
    Ok(variants)
}

/// Rejects zero as well as anything that is not an unsigned integer.
pub fn parse_positive(key: &str, raw: &str) -> Result<usize> {
    let value = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("{key} must be a positive integer"))?;
    if value == 0 {
        bail!("{key} must be a positive integer");
    }
    Ok(value)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_variants_in_order() {
        let variants = parse_model_variants(DEFAULT_MODEL_VARIANTS).unwrap();
        assert_eq!(
            variants,
            vec![
                "claude-sonnet-4-5",
                "claude-3-7-sonnet-latest",
                "claude-3-5-haiku-latest"
            ]
        );
    }

    #[test]
    fn test_variants_trimmed_and_deduplicated() {
        let variants = parse_model_variants(" a , ,b,a ").unwrap();
        assert_eq!(variants, vec!["a", "b"]);
    }

    #[test]
    fn test_positive_limits() {
        assert_eq!(parse_positive("MAX_JOB_TEXT_CHARS", "12000").unwrap(), 12_000);
        assert!(parse_positive("MAX_JOB_TEXT_CHARS", "0").is_err());
        assert!(parse_positive("MAX_JOB_TEXT_CHARS", "-5").is_err());
        assert!(parse_positive("MAX_OUTPUT_TOKENS", "lots").is_err());
    }

    #[test]
    fn test_empty_variant_list_rejected() {
        assert!(parse_model_variants("").is_err());
        assert!(parse_model_variants(" , ").is_err());
    }
}
