//! Storage format of application answers.
//!
//! Every answer is stored as text. Structured answers (checkbox selections,
//! uploaded file references, nested objects) are stored as canonical JSON so
//! they can be decoded again when recruiters read them back.

use serde_json::{json, Map, Value};

use super::models::{LabelledResponse, NewResponse};
use crate::shared::AppError;

/// Field types whose stored value is a JSON document
fn is_structured(field_type: &str) -> bool {
    matches!(field_type, "checkbox" | "file")
}

/// Converts a submitted value to its stored text form; `null` stays NULL
pub fn normalize_value(field_type: Option<&str>, value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    if field_type == Some("file") {
        return Some(match value {
            Value::Object(map) if map.contains_key("filename") => value.to_string(),
            Value::String(name) => json!({ "filename": name }).to_string(),
            other => json!({ "filename": other }).to_string(),
        });
    }

    let stored = match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        Value::String(text) if text.starts_with('[') && text.ends_with(']') => {
            match serde_json::from_str::<Value>(text) {
                Ok(parsed @ Value::Array(_)) => parsed.to_string(),
                _ => text.clone(),
            }
        }
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Some(stored)
}

/// Reverses `normalize_value` for structured field types; other values stay text
pub fn decode_value(field_type: &str, stored: Option<String>) -> Value {
    let Some(stored) = stored else {
        return Value::Null;
    };
    if is_structured(field_type) {
        if let Ok(parsed) = serde_json::from_str::<Value>(&stored) {
            return parsed;
        }
    }
    Value::String(stored)
}

/// Label → decoded value map for one application
pub fn responses_by_label<'a>(rows: impl Iterator<Item = &'a LabelledResponse>) -> Map<String, Value> {
    rows.map(|row| {
        (
            row.field_label.clone(),
            decode_value(&row.field_type, row.field_value.clone()),
        )
    })
    .collect()
}

/// `responses` may arrive as an array or as a JSON string holding one
pub fn parse_responses(raw: Option<Value>) -> Result<Vec<Value>, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest("responses is required".to_string()))?;
    let parsed = match raw {
        Value::String(text) => serde_json::from_str::<Value>(&text).map_err(|_| {
            AppError::BadRequest("responses array is required".to_string())
        })?,
        other => other,
    };
    match parsed {
        Value::Array(items) if !items.is_empty() => Ok(items),
        _ => Err(AppError::BadRequest(
            "responses array is required".to_string(),
        )),
    }
}

/// Validates one submitted answer. `known_type` is the form field's declared
/// type, used when the client did not repeat it.
pub fn to_new_response(
    index: usize,
    item: &Value,
    known_type: impl Fn(i64) -> Option<String>,
) -> Result<NewResponse, AppError> {
    let invalid = || AppError::BadRequest(format!("Invalid response at index {}", index));

    let field_id = match item.get("field_id") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
    .ok_or_else(invalid)?;

    let value = item.get("field_value").ok_or_else(invalid)?;
    let field_type = item
        .get("field_type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| known_type(field_id));

    Ok(NewResponse {
        field_id,
        field_value: normalize_value(field_type.as_deref(), value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("file"), json!("cv.pdf"), r#"{"filename":"cv.pdf"}"#)]
    #[case(Some("checkbox"), json!(["a", "b"]), r#"["a","b"]"#)]
    #[case(Some("text"), json!("[ \"x\" , \"y\" ]"), r#"["x","y"]"#)]
    #[case(Some("text"), json!("[not json]"), "[not json]")]
    #[case(None, json!({"k": 1}), r#"{"k":1}"#)]
    #[case(None, json!(42), "42")]
    #[case(None, json!(true), "true")]
    #[case(Some("text"), json!("hello"), "hello")]
    fn test_normalize_value(#[case] field_type: Option<&str>, #[case] value: Value, #[case] expected: &str) {
        assert_eq!(normalize_value(field_type, &value).as_deref(), Some(expected));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("text"))]
    #[case(Some("file"))]
    fn test_null_answer_is_stored_as_null(#[case] field_type: Option<&str>) {
        assert_eq!(normalize_value(field_type, &Value::Null), None);
        let item = json!({"field_id": 4, "field_value": null});
        let response = to_new_response(0, &item, |_| field_type.map(str::to_string)).unwrap();
        assert_eq!(response.field_value, None);
        assert_eq!(decode_value(field_type.unwrap_or("text"), response.field_value), Value::Null);
    }

    #[test]
    fn test_decode_value() {
        assert_eq!(
            decode_value("checkbox", Some(r#"["a","b"]"#.to_string())),
            json!(["a", "b"])
        );
        assert_eq!(
            decode_value("file", Some(r#"{"filename":"cv.pdf"}"#.to_string()))["filename"],
            "cv.pdf"
        );
        assert_eq!(decode_value("checkbox", Some("oops".to_string())), json!("oops"));
        assert_eq!(decode_value("text", Some("[1]".to_string())), json!("[1]"));
        assert_eq!(decode_value("text", None), Value::Null);
    }

    #[test]
    fn test_parse_responses_accepts_json_string() {
        let items = parse_responses(Some(json!(r#"[{"field_id": 1, "field_value": "x"}]"#))).unwrap();
        assert_eq!(items.len(), 1);

        assert!(parse_responses(None).is_err());
        assert!(parse_responses(Some(json!([]))).is_err());
        assert!(parse_responses(Some(json!("not json"))).is_err());
        assert!(parse_responses(Some(json!({"field_id": 1}))).is_err());
    }

    #[test]
    fn test_to_new_response_uses_declared_type() {
        let item = json!({"field_id": 7, "field_value": "resume.pdf"});
        let response = to_new_response(0, &item, |_| Some("file".to_string())).unwrap();
        assert_eq!(response.field_value.as_deref(), Some(r#"{"filename":"resume.pdf"}"#));

        let missing_value = json!({"field_id": 7});
        assert!(matches!(
            to_new_response(3, &missing_value, |_| None),
            Err(AppError::BadRequest(msg)) if msg == "Invalid response at index 3"
        ));
    }
}
