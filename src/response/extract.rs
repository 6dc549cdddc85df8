//! Locate and parse the JSON object inside a model reply.

use serde_json::{Map, Value};

use crate::error::ResponseError;

/// Maximum size of a model reply in bytes.
pub const MAX_JSON_SIZE: usize = 100_000;

/// Parse the span from the first `{` to the last `}` of `raw` as a JSON object.
///
/// Surrounding prose and code fences are ignored.
///
/// # Errors
///
/// - [`ResponseError::TooLarge`] if `raw` exceeds [`MAX_JSON_SIZE`] bytes
/// - [`ResponseError::NoJson`] if there is no `{ ... }` span
/// - [`ResponseError::JsonParseFailed`] if the span is not a JSON object
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, ResponseError> {
    // Size check before any scanning.
    if raw.len() > MAX_JSON_SIZE {
        return Err(ResponseError::TooLarge {
            size: raw.len(),
            max: MAX_JSON_SIZE,
        });
    }

    let (Some(first), Some(last)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(ResponseError::NoJson);
    };
    if first >= last {
        return Err(ResponseError::NoJson);
    }

    // Both indices sit on ASCII braces, so the slice is on char boundaries.
    let candidate = &raw[first..=last];
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ResponseError::JsonParseFailed {
            message: "expected a JSON object".into(),
        }),
        Err(e) => Err(ResponseError::JsonParseFailed {
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_bare_object() {
        let map = extract_json(r#"{"latestNews": []}"#).unwrap();
        assert!(map.contains_key("latestNews"));
    }

    #[test]
    fn test_extract_from_fenced_reply() {
        let raw = "Here you go:\n```json\n{\"featuredPrograms\":[],\"latestNews\":[]}\n```";
        let map = extract_json(raw).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_extract_nested_braces() {
        let raw = r#"Sure! {"featuredPrograms": [{"title": "A"}]} Hope that helps {:}"#;
        // The last brace belongs to trailing prose, which breaks parsing.
        assert!(matches!(
            extract_json(raw),
            Err(ResponseError::JsonParseFailed { .. })
        ));

        let raw = r#"Sure! {"featuredPrograms": [{"title": "A"}]} done"#;
        let map = extract_json(raw).unwrap();
        assert_eq!(map["featuredPrograms"][0]["title"], "A");
    }

    #[test]
    fn test_no_braces() {
        assert_eq!(extract_json("no json here"), Err(ResponseError::NoJson));
        assert_eq!(extract_json(""), Err(ResponseError::NoJson));
    }

    #[test]
    fn test_reversed_braces() {
        assert_eq!(extract_json("} then {"), Err(ResponseError::NoJson));
    }

    #[test]
    fn test_invalid_json() {
        let err = extract_json("{not: valid}").unwrap_err();
        assert!(matches!(err, ResponseError::JsonParseFailed { .. }));
    }

    #[test]
    fn test_bare_array_has_no_object() {
        assert_eq!(extract_json("[1, 2]"), Err(ResponseError::NoJson));
    }

    #[test]
    fn test_size_limit() {
        let within = format!("{{\"d\":\"{}\"}}", "x".repeat(MAX_JSON_SIZE - 10));
        assert!(extract_json(&within).is_ok());

        let huge = "x".repeat(MAX_JSON_SIZE + 1);
        assert_eq!(
            extract_json(&huge),
            Err(ResponseError::TooLarge {
                size: MAX_JSON_SIZE + 1,
                max: MAX_JSON_SIZE,
            })
        );
    }

    #[test]
    fn test_multibyte_prose_around_json() {
        let map = extract_json("Voilà: {\"latestNews\": []} ✓").unwrap();
        assert!(map.contains_key("latestNews"));
    }
}
