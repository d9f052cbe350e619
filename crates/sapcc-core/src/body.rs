//! Request body builder for create and update options.
//!
//! Options structs derive `Serialize` and mark every optional field
//! `skip_serializing_if = "Option::is_none"`. The builder turns such a value
//! into a JSON object, checks the required keys and wraps the object under a
//! root key when the API expects an envelope.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Options types that translate into a JSON request body.
pub trait ToRequestBody {
    /// Build the request body for these options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingInput`] when a required field is zero.
    fn to_request_body(&self) -> Result<Value>;
}

/// Serialize `opts`, enforce `required` keys and wrap under `root` if given.
///
/// A required key counts as missing when it is absent or holds a zero value:
/// `null`, `""`, `[]` or `{}`. Numbers and booleans are always present once
/// serialized.
///
/// # Errors
///
/// Returns [`Error::MissingInput`] naming the first missing key, or
/// [`Error::InvalidInput`] when `opts` does not serialize to a JSON object.
pub fn build_request_body<T>(opts: &T, root: Option<&str>, required: &[&str]) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(opts)
        .map_err(|err| Error::InvalidInput(format!("cannot encode request body: {err}")))?;

    let Value::Object(map) = value else {
        return Err(Error::InvalidInput(
            "request options must encode to a JSON object".to_string(),
        ));
    };

    if let Some(missing) = required.iter().find(|key| is_missing(map.get(**key))) {
        return Err(Error::MissingInput((*missing).to_string()));
    }

    Ok(wrap(map, root))
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => false,
    }
}

fn wrap(map: Map<String, Value>, root: Option<&str>) -> Value {
    match root {
        Some(root) => {
            let mut outer = Map::new();
            outer.insert(root.to_string(), Value::Object(map));
            Value::Object(outer)
        }
        None => Value::Object(map),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize, Default)]
    struct CreateOpts {
        #[serde(skip_serializing_if = "String::is_empty")]
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tags: Vec<String>,
        timeout: u32,
    }

    #[test]
    fn wraps_under_root_key() {
        let opts = CreateOpts {
            name: "ic-1".into(),
            ..CreateOpts::default()
        };
        let body = build_request_body(&opts, Some("interconnection"), &["name"]).unwrap();
        assert_eq!(
            body,
            json!({"interconnection": {"name": "ic-1", "timeout": 0}})
        );
    }

    #[test]
    fn missing_required_key_is_named() {
        let opts = CreateOpts::default();
        let err = build_request_body(&opts, None, &["timeout", "name"]).unwrap_err();
        assert_eq!(err, Error::MissingInput("name".to_string()));
    }

    #[test]
    fn explicit_zero_optional_is_kept() {
        let opts = CreateOpts {
            name: "x".into(),
            description: Some(String::new()),
            ..CreateOpts::default()
        };
        let body = build_request_body(&opts, None, &[]).unwrap();
        assert_eq!(body["description"], json!(""));

        let opts = CreateOpts {
            name: "x".into(),
            ..CreateOpts::default()
        };
        let body = build_request_body(&opts, None, &[]).unwrap();
        assert!(body.get("description").is_none());
    }

    #[test]
    fn empty_array_counts_as_missing() {
        let opts = CreateOpts {
            name: "x".into(),
            ..CreateOpts::default()
        };
        let err = build_request_body(&opts, None, &["tags"]).unwrap_err();
        assert_eq!(err, Error::MissingInput("tags".to_string()));
    }

    #[test]
    fn non_object_options_are_rejected() {
        let err = build_request_body(&vec![1, 2], None, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
