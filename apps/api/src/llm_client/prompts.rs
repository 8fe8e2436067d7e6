// Shared prompt fragments.
// Each pipeline stage defines its own templates in tailoring/prompts.rs.

/// Appended to every system prompt: the recoverer tolerates prose, but JSON-only
/// replies keep recovery on its first candidate.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with a single valid JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Grounding rule shared by generation and verification.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: The ORIGINAL RESUME is the only source of truth. \
    Every fact, metric, employer, title, date, and skill must be traceable to it. \
    Do NOT infer, interpolate, round up, or invent numbers. \
    If the original resume does not support a claim, do not make it.";

/// Fills `{name}` placeholders in one pass. Substituted values are never
/// rescanned, so user text containing `{resume_text}` stays literal.
/// Braces that do not name a known placeholder are copied through.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = after.find('}').and_then(|end| {
            let key = &after[..end];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (end, *value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_substitutes_known_placeholders() {
        let filled = fill_template("A {x} B {y}", &[("x", "1"), ("y", "2")]);
        assert_eq!(filled, "A 1 B 2");
    }

    #[test]
    fn test_fill_template_keeps_json_braces() {
        let template = r#"{"text": "{x}", "n": {}}"#;
        assert_eq!(
            fill_template(template, &[("x", "hi")]),
            r#"{"text": "hi", "n": {}}"#
        );
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template(
            "JOB: {job}\nRESUME: {resume}",
            &[("job", "see {resume}"), ("resume", "Ada")],
        );
        assert_eq!(filled, "JOB: see {resume}\nRESUME: Ada");
    }
}
