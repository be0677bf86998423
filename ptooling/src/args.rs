//! Parsing of the JSON argument strings models send with a tool call.
//!
//! ```rust
//! use ptooling::{no_arguments, parse_json_object, required_string};
//!
//! let args = parse_json_object(r#"{"city":"Pune"}"#).expect("object should parse");
//! assert_eq!(required_string(&args, "city").expect("city should be present"), "Pune");
//! assert!(no_arguments("null").is_ok());
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    // Hosted models send "" or "null" for argument-less calls.
    if args_json.trim().is_empty() {
        return Ok(Map::new());
    }

    let value = serde_json::from_str::<Value>(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

/// Accepts an empty object and nothing else.
pub fn no_arguments(args_json: &str) -> Result<(), ToolError> {
    let args = parse_json_object(args_json)?;
    match args.keys().next() {
        None => Ok(()),
        Some(key) => Err(ToolError::invalid_arguments(format!(
            "unexpected argument: '{key}'"
        ))),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolErrorKind;

    #[test]
    fn parse_object_and_extract_required_string() {
        let args = parse_json_object("{\"query\":\"rust\"}").expect("args should parse");
        let query = required_string(&args, "query").expect("query should exist");
        assert_eq!(query, "rust");
    }

    #[test]
    fn parse_invalid_json_returns_invalid_arguments() {
        let error = parse_json_object("{").expect_err("json should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert!(error.message.starts_with("invalid JSON arguments"));
    }

    #[test]
    fn blank_and_null_arguments_are_empty_objects() {
        assert!(parse_json_object("").expect("blank").is_empty());
        assert!(parse_json_object("null").expect("null").is_empty());
        assert!(no_arguments("{}").is_ok());
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let error = parse_json_object("[1,2]").expect_err("array is not an object");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);

        let error = no_arguments(r#"{"tz":"UTC"}"#).expect_err("no arguments expected");
        assert!(error.message.contains("tz"));
    }

    #[test]
    fn required_string_rejects_wrong_types() {
        let args = parse_json_object(r#"{"city":7}"#).expect("parses");
        let error = required_string(&args, "city").expect_err("number is not a string");
        assert_eq!(error.message, "missing required string: 'city'");
    }
}
