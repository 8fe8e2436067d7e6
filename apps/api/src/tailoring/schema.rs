//! Schema Validator: the boundary where untyped model JSON becomes typed data.
//!
//! Two payload shapes are accepted: generation output and verification output.
//! Validation collects every `(path, message)` issue instead of stopping at the
//! first, and callers surface the list verbatim. Paths are dot-joined with array
//! indices as segments, e.g. `tailoredResumeJson.experience.0.bullets`.
//!
//! Before validation, explicit `null`s on optional string fields are dropped so
//! that "absent" and "null" mean the same thing.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::tailoring::models::{
    ClaimMapEntry, Section, SuggestedAddition, TailoredResume, VerificationStatus,
};

const ROOT: &str = "(root)";

/// Optional string fields anywhere in a generation payload.
const GENERATION_OPTIONAL_STRINGS: &[&str] = &[
    "email",
    "phone",
    "location",
    "linkedin",
    "github",
    "portfolio",
    "website",
    "url",
    "dateRange",
    "degree",
    "evidence",
    "coverLetterText",
    "suggestedBullet",
];

/// Optional string fields anywhere in a verification payload.
const VERIFICATION_OPTIONAL_STRINGS: &[&str] = &["bulletId", "bulletText", "suggestedFix"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Generation,
    Verification,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Generation => f.write_str("generation"),
            PayloadKind::Verification => f.write_str("verification"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{kind} output failed validation: {}", format_issues(.issues))]
pub struct SchemaError {
    pub kind: PayloadKind,
    pub issues: Vec<FieldIssue>,
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ────────────────────────────────────────────────────────────────────────────
// Validated payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    pub tailored_resume_json: TailoredResume,
    #[serde(default)]
    pub cover_letter_text: Option<String>,
    #[serde(default)]
    pub claim_map: Vec<ClaimMapEntry>,
    #[serde(default)]
    pub suggested_additions: Vec<SuggestedAddition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationPayload {
    pub verifications: Vec<RawVerification>,
}

/// A verdict as the verifier wrote it, before it is tied to an extracted bullet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVerification {
    #[serde(default)]
    pub bullet_id: Option<String>,
    #[serde(default)]
    pub bullet_text: String,
    pub status: VerificationStatus,
    pub reason: String,
    pub evidence: String,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Validates generation output. With `require_cover_letter`, `coverLetterText`
/// must be present and non-empty.
pub fn validate_generation(
    mut value: Value,
    require_cover_letter: bool,
) -> Result<GenerationPayload, SchemaError> {
    strip_null_optionals(&mut value, GENERATION_OPTIONAL_STRINGS);
    promote_string_bullets(&mut value);

    let mut c = Checker::default();
    if let Some(root) = c.expect_object(&value, ROOT) {
        if let Some(resume) = c.object(root, "", "tailoredResumeJson", true) {
            check_resume(&mut c, resume, "tailoredResumeJson");
        }

        let cover_rule = if require_cover_letter {
            Rule::NonEmpty
        } else {
            Rule::Optional
        };
        c.string(root, "", "coverLetterText", cover_rule);

        for (path, entry) in c.object_list(root, "", "claimMap", false, 0) {
            c.string(entry, &path, "bulletText", Rule::Required);
            c.string(entry, &path, "evidence", Rule::Required);
            c.one_of(entry, &path, "section", &Section::ALL);
            c.index(entry, &path, "index");
        }

        for (path, addition) in c.object_list(root, "", "suggestedAdditions", false, 0) {
            c.string(addition, &path, "requirement", Rule::NonEmpty);
            c.string(addition, &path, "rationale", Rule::Required);
            c.string(addition, &path, "suggestedBullet", Rule::Optional);
        }
    }

    c.finish(PayloadKind::Generation, value)
}

pub fn validate_verification(mut value: Value) -> Result<VerificationPayload, SchemaError> {
    strip_null_optionals(&mut value, VERIFICATION_OPTIONAL_STRINGS);

    let mut c = Checker::default();
    if let Some(root) = c.expect_object(&value, ROOT) {
        for (path, item) in c.object_list(root, "", "verifications", true, 0) {
            c.string(item, &path, "bulletId", Rule::Optional);
            c.string(item, &path, "bulletText", Rule::Optional);
            c.one_of(item, &path, "status", &VerificationStatus::ALL);
            c.string(item, &path, "reason", Rule::Required);
            c.string(item, &path, "evidence", Rule::Required);
            c.string(item, &path, "suggestedFix", Rule::Optional);
        }
    }

    c.finish(PayloadKind::Verification, value)
}

fn check_resume(c: &mut Checker, resume: &Map<String, Value>, path: &str) {
    c.string(resume, path, "name", Rule::NonEmpty);
    c.string(resume, path, "summary", Rule::Required);
    c.string_list(resume, path, "skills", true);

    if let Some(contact) = c.object(resume, path, "contact", false) {
        let contact_path = join(path, "contact");
        for key in ["email", "phone", "location"] {
            c.string(contact, &contact_path, key, Rule::Optional);
        }
    }

    if let Some(links) = c.object(resume, path, "links", false) {
        let links_path = join(path, "links");
        for key in ["linkedin", "github", "portfolio", "website"] {
            c.string(links, &links_path, key, Rule::Optional);
        }
    }

    for (item_path, item) in c.object_list(resume, path, "experience", true, 0) {
        c.string(item, &item_path, "title", Rule::NonEmpty);
        c.string(item, &item_path, "company", Rule::NonEmpty);
        c.string(item, &item_path, "location", Rule::Optional);
        c.string(item, &item_path, "dateRange", Rule::Optional);
        for (bullet_path, bullet) in c.object_list(item, &item_path, "bullets", true, 1) {
            check_bullet(c, bullet, &bullet_path);
        }
    }

    for (item_path, item) in c.object_list(resume, path, "projects", false, 0) {
        c.string(item, &item_path, "name", Rule::NonEmpty);
        c.string(item, &item_path, "url", Rule::Optional);
        c.string(item, &item_path, "dateRange", Rule::Optional);
        c.string_list(item, &item_path, "tech", false);
        for (bullet_path, bullet) in c.object_list(item, &item_path, "bullets", false, 0) {
            check_bullet(c, bullet, &bullet_path);
        }
    }

    for (item_path, item) in c.object_list(resume, path, "education", false, 0) {
        c.string(item, &item_path, "school", Rule::NonEmpty);
        c.string(item, &item_path, "degree", Rule::Optional);
        c.string(item, &item_path, "dateRange", Rule::Optional);
        c.string_list(item, &item_path, "details", false);
    }

    if let Some(meta) = c.object(resume, path, "tailoring", false) {
        let meta_path = join(path, "tailoring");
        for key in ["targetedKeywords", "matchedRequirements", "unmatchedRequirements"] {
            c.string_list(meta, &meta_path, key, false);
        }
    }
}

fn check_bullet(c: &mut Checker, bullet: &Map<String, Value>, path: &str) {
    c.string(bullet, path, "text", Rule::NonEmpty);
    c.string(bullet, path, "evidence", Rule::Optional);
}

// ────────────────────────────────────────────────────────────────────────────
// Pre-validation normalization
// ────────────────────────────────────────────────────────────────────────────

/// Removes `key: null` pairs for the named optional keys, at any depth.
pub fn strip_null_optionals(value: &mut Value, optional_keys: &[&str]) {
    match value {
        Value::Object(map) => {
            map.retain(|key, v| !(v.is_null() && optional_keys.contains(&key.as_str())));
            for v in map.values_mut() {
                strip_null_optionals(v, optional_keys);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_null_optionals(item, optional_keys);
            }
        }
        _ => {}
    }
}

/// Turns bare-string bullets into `{"text": ...}` objects.
fn promote_string_bullets(value: &mut Value) {
    let Some(resume) = value.get_mut("tailoredResumeJson") else {
        return;
    };
    for section in ["experience", "projects"] {
        let Some(Value::Array(items)) = resume.get_mut(section) else {
            continue;
        };
        for item in items {
            let Some(Value::Array(bullets)) = item.get_mut("bullets") else {
                continue;
            };
            for bullet in bullets.iter_mut() {
                if let Value::String(text) = bullet {
                    let text = std::mem::take(text);
                    *bullet = serde_json::json!({ "text": text });
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Checker
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Required,
    NonEmpty,
    Optional,
}

#[derive(Default)]
struct Checker {
    issues: Vec<FieldIssue>,
}

impl Checker {
    fn push(&mut self, path: String, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            path,
            message: message.into(),
        });
    }

    fn finish<T: DeserializeOwned>(self, kind: PayloadKind, value: Value) -> Result<T, SchemaError> {
        if !self.issues.is_empty() {
            return Err(SchemaError {
                kind,
                issues: self.issues,
            });
        }
        serde_json::from_value(value).map_err(|e| SchemaError {
            kind,
            issues: vec![FieldIssue {
                path: ROOT.to_string(),
                message: e.to_string(),
            }],
        })
    }

    fn expect_object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.push(
                    path.to_string(),
                    format!("Expected object, received {}", type_name(other)),
                );
                None
            }
        }
    }

    fn field<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() && required {
            self.push(join(path, key), "Required");
        }
        value
    }

    fn object<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
    ) -> Option<&'v Map<String, Value>> {
        let value = self.field(obj, path, key, required)?;
        self.expect_object(value, &join(path, key))
    }

    fn string(&mut self, obj: &Map<String, Value>, path: &str, key: &str, rule: Rule) {
        let Some(value) = self.field(obj, path, key, rule != Rule::Optional) else {
            return;
        };
        match value {
            Value::String(s) if rule == Rule::NonEmpty && s.trim().is_empty() => {
                self.push(join(path, key), "String must not be empty");
            }
            Value::String(_) => {}
            other => self.push(
                join(path, key),
                format!("Expected string, received {}", type_name(other)),
            ),
        }
    }

    fn string_list(&mut self, obj: &Map<String, Value>, path: &str, key: &str, required: bool) {
        let Some(value) = self.field(obj, path, key, required) else {
            return;
        };
        let list_path = join(path, key);
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        self.push(
                            join(&list_path, &i.to_string()),
                            format!("Expected string, received {}", type_name(item)),
                        );
                    }
                }
            }
            other => self.push(
                list_path,
                format!("Expected array, received {}", type_name(other)),
            ),
        }
    }

    /// Returns `(path, object)` for every well-formed element so callers can recurse.
    fn object_list<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        path: &str,
        key: &str,
        required: bool,
        min_items: usize,
    ) -> Vec<(String, &'v Map<String, Value>)> {
        let Some(value) = self.field(obj, path, key, required) else {
            return Vec::new();
        };
        let list_path = join(path, key);
        let Value::Array(items) = value else {
            self.push(
                list_path,
                format!("Expected array, received {}", type_name(value)),
            );
            return Vec::new();
        };
        if items.len() < min_items {
            self.push(
                list_path.clone(),
                format!("Array must contain at least {min_items} element(s)"),
            );
        }
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let item_path = join(&list_path, &i.to_string());
                self.expect_object(item, &item_path)
                    .map(|map| (item_path, map))
            })
            .collect()
    }

    fn one_of(&mut self, obj: &Map<String, Value>, path: &str, key: &str, allowed: &[&str]) {
        let Some(value) = self.field(obj, path, key, true) else {
            return;
        };
        match value {
            Value::String(s) if allowed.contains(&s.as_str()) => {}
            Value::String(s) => self.push(
                join(path, key),
                format!(
                    "Invalid enum value. Expected {}, received '{s}'",
                    allowed.join(" | ")
                ),
            ),
            other => self.push(
                join(path, key),
                format!("Expected string, received {}", type_name(other)),
            ),
        }
    }

    fn index(&mut self, obj: &Map<String, Value>, path: &str, key: &str) {
        let Some(value) = self.field(obj, path, key, false) else {
            return;
        };
        if value.is_null() {
            return;
        }
        let fits = value.as_u64().is_some_and(|n| n <= u64::from(u32::MAX));
        if !fits {
            self.push(join(path, key), "Expected non-negative integer");
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
