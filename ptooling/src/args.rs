//! JSON argument helpers for function and trait-based tools.
//!
//! ```rust
//! use ptooling::{object_arguments, optional_string, required_string};
//! use serde_json::json;
//!
//! let args = json!({"location": "Warsaw"});
//! let args = object_arguments(&args).expect("object arguments");
//! assert_eq!(required_string(args, "location").expect("present"), "Warsaw");
//! assert_eq!(optional_string(args, "unit"), None);
//! ```

use serde_json::{Map, Value};

use crate::{INVALID_ARGUMENTS, ToolError};

/// Parses raw call arguments. Any failure reports the fixed message
/// `invalid arguments`.
pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json).map_err(|_| ToolError::invalid_arguments(INVALID_ARGUMENTS))
}

pub fn parse_json_object(args_json: &str) -> Result<Map<String, Value>, ToolError> {
    match parse_json_value(args_json)? {
        Value::Object(map) => Ok(map),
        _ => Err(ToolError::invalid_arguments("expected JSON object arguments")),
    }
}

pub fn object_arguments(args: &Value) -> Result<&Map<String, Value>, ToolError> {
    args.as_object()
        .ok_or_else(|| ToolError::invalid_arguments("expected JSON object arguments"))
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(ToString::to_string)
}
