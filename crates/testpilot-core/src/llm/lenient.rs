//! Lenient JSON decoding for model output
//!
//! Model responses are close to, but not reliably, clean JSON: keys come
//! back in PascalCase or camelCase, and the object is often wrapped in a
//! markdown code fence. The decode step here normalizes keys to snake_case
//! and strips fences before handing the value to serde. Unit enum variants
//! already parse from their string form under serde.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode model-produced JSON text into `T`.
///
/// Returns `None` when the text holds no decodable value; never errors.
pub fn from_lenient_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let stripped = strip_code_fences(text.trim());

    let value: Value = match serde_json::from_str(stripped) {
        Ok(v) => v,
        // Fall back to the outermost object if the model added prose
        Err(_) => {
            let start = stripped.find('{')?;
            let end = stripped.rfind('}')?;
            serde_json::from_str(&stripped[start..=end]).ok()?
        }
    };

    if value.is_null() {
        return None;
    }

    serde_json::from_value(normalize_keys(value)).ok()
}

/// Strip a surrounding markdown code fence, with or without a language tag
fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Skip the language tag on the opening fence line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Recursively rewrite object keys to snake_case
fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut normalized = serde_json::Map::new();
            for (k, v) in obj {
                normalized.insert(to_snake_case(&k), normalize_keys(v));
            }
            Value::Object(normalized)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    let mut result = String::with_capacity(key.len());
    let mut prev_lower = false;

    for c in key.chars() {
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Default, PartialEq)]
    struct Verdict {
        passed: Option<bool>,
        summary: Option<String>,
        defect_count: Option<u32>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Severity {
        Low,
        High,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Finding {
        severity: Severity,
    }

    #[test]
    fn test_snake_case_keys_pass_through() {
        let verdict: Verdict =
            from_lenient_json(r#"{"passed": true, "summary": "ok"}"#).unwrap();
        assert_eq!(verdict.passed, Some(true));
        assert_eq!(verdict.summary.as_deref(), Some("ok"));
    }

    #[test]
    fn test_pascal_case_keys() {
        let verdict: Verdict =
            from_lenient_json(r#"{"Passed": false, "DefectCount": 3}"#).unwrap();
        assert_eq!(verdict.passed, Some(false));
        assert_eq!(verdict.defect_count, Some(3));
    }

    #[test]
    fn test_camel_case_keys() {
        let verdict: Verdict = from_lenient_json(r#"{"defectCount": 1}"#).unwrap();
        assert_eq!(verdict.defect_count, Some(1));
    }

    #[test]
    fn test_missing_fields_yield_defaults() {
        // Valid JSON with none of the expected fields decodes, not errors
        let verdict: Verdict = from_lenient_json(r#"{"unexpected": "value"}"#).unwrap();
        assert_eq!(verdict, Verdict::default());
    }

    #[test]
    fn test_non_json_yields_none() {
        assert_eq!(
            from_lenient_json::<Verdict>("the page looks fine to me"),
            None
        );
        assert_eq!(from_lenient_json::<Verdict>(""), None);
        assert_eq!(from_lenient_json::<Verdict>("null"), None);
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"passed\": true}\n```";
        let verdict: Verdict = from_lenient_json(text).unwrap();
        assert_eq!(verdict.passed, Some(true));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let text = "Here is the result: {\"passed\": true} as requested.";
        let verdict: Verdict = from_lenient_json(text).unwrap();
        assert_eq!(verdict.passed, Some(true));
    }

    #[test]
    fn test_enum_from_string() {
        let finding: Finding = from_lenient_json(r#"{"Severity": "high"}"#).unwrap();
        assert_eq!(finding.severity, Severity::High);
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("DefectCount"), "defect_count");
        assert_eq!(to_snake_case("defectCount"), "defect_count");
        assert_eq!(to_snake_case("passed"), "passed");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }
}
