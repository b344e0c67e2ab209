use crate::{Error, Result};
use serde_json::Value;

/// Pulls the JSON object out of a model completion.
///
/// A fenced ```json block wins when it parses; otherwise the span from the
/// first `{` to the last `}` is parsed. Prose containing stray braces
/// outside the object defeats the span heuristic.
pub fn extract_json_object(text: &str) -> Result<Value> {
    let text = text.trim();

    if let Some(i) = text.find("```json") {
        let rest = &text[i + "```json".len()..];
        if let Some(j) = rest.find("```") {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(rest[..j].trim()) {
                return Ok(value);
            }
        }
    }

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(Error::parse("completion contains no JSON object"));
    };
    if end < start {
        return Err(Error::parse("completion contains no JSON object"));
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(Error::parse("completion JSON is not an object")),
        Err(e) => Err(Error::parse(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_bare_object_is_returned_as_is() {
        let value = extract_json_object(r#"{"final_decision": {"final_label": "fraud"}}"#).unwrap();
        assert_eq!(value, json!({"final_decision": {"final_label": "fraud"}}));
    }

    #[test]
    fn test_object_wrapped_in_prose() {
        let text = r#"Here is the result: {"is_fraudulent": true, "nested": {"a": 1}} Thanks."#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value, json!({"is_fraudulent": true, "nested": {"a": 1}}));
    }

    #[test]
    fn test_fenced_block_is_preferred() {
        let text = "Notes {draft}\n```json\n{\"ok\": true}\n```\nDone {end}";
        assert_eq!(extract_json_object(text).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_no_braces_is_parse_error() {
        let err = extract_json_object("I cannot help with that.").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_reversed_braces_is_parse_error() {
        assert!(extract_json_object("} nothing here {").is_err());
    }

    #[test]
    fn test_stray_braces_in_prose_break_extraction() {
        let text = r#"Use {curly} notes: {"a": 1}"#;
        assert!(matches!(extract_json_object(text), Err(Error::Parse(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(extract_json_object(r#"{"a": 1,}"#).is_err());
    }
}
