//! Field specifications and dot-path resolution.
//!
//! An API key such as `ContactMethods.Phone` is split on `.` and walked one
//! segment at a time. Object segments look up a key; when the current value is
//! an array, a segment that parses as an index selects that element.
//!
//! Every segment is checked. A missing key at any depth produces a
//! [`FieldMiss`] naming the depth it failed at, and the caller decides how to
//! report it. `null` is a present value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, Result};

/// Declarative mapping from one client-facing key to a path in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub client_key: String,
    pub api_key: String,
    #[serde(default)]
    pub default: Value,
}

impl FieldSpec {
    #[must_use]
    pub fn new(
        client_key: impl Into<String>,
        api_key: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            client_key: client_key.into(),
            api_key: api_key.into(),
            default: default.into(),
        }
    }

    /// Path segments of the API key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.api_key.split('.')
    }

    /// Reject keys that can never resolve: empty keys and empty segments.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.client_key.is_empty() {
            Some("client key is empty")
        } else if self.api_key.is_empty() {
            Some("api key is empty")
        } else if self.segments().any(str::is_empty) {
            Some("api key has an empty path segment")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ModelError::InvalidApiKey {
                client_key: self.client_key.clone(),
                api_key: self.api_key.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// A path segment that was not present in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMiss {
    pub client_key: String,
    pub api_key: String,
    /// Zero-based index of the segment that failed.
    pub depth: usize,
    pub segment: String,
}

impl FieldMiss {
    /// Whether the first segment was already absent.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }
}

/// One path step: an object key, or an index when `current` is an array.
pub(crate) fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Walk `api_key` through `root`.
///
/// On failure returns the depth and name of the first missing segment.
pub fn resolve_path<'a>(
    root: &'a Value,
    api_key: &str,
) -> std::result::Result<&'a Value, (usize, String)> {
    let mut current = root;
    for (depth, segment) in api_key.split('.').enumerate() {
        current = step(current, segment).ok_or_else(|| (depth, segment.to_string()))?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_objects() {
        let payload = json!({ "A": { "B": { "C": "x" } } });
        assert_eq!(resolve_path(&payload, "A.B.C"), Ok(&json!("x")));
    }

    #[test]
    fn reports_depth_of_first_missing_segment() {
        let payload = json!({ "A": { "B": 1 } });
        assert_eq!(resolve_path(&payload, "Z.B"), Err((0, "Z".to_string())));
        assert_eq!(resolve_path(&payload, "A.Z"), Err((1, "Z".to_string())));
        assert_eq!(resolve_path(&payload, "A.B.C"), Err((2, "C".to_string())));
    }

    #[test]
    fn indexes_arrays() {
        let payload = json!({ "Phones": ["555-0100", "555-0199"] });
        assert_eq!(resolve_path(&payload, "Phones.1"), Ok(&json!("555-0199")));
        assert!(resolve_path(&payload, "Phones.2").is_err());
        assert!(resolve_path(&payload, "Phones.first").is_err());
    }

    #[test]
    fn null_is_present() {
        let payload = json!({ "Name": null });
        assert_eq!(resolve_path(&payload, "Name"), Ok(&Value::Null));
    }

    #[test]
    fn validate_rejects_empty_segments() {
        assert!(FieldSpec::new("phone", "ContactMethods.Phone", "").validate().is_ok());
        assert!(FieldSpec::new("phone", "", "").validate().is_err());
        assert!(FieldSpec::new("phone", "A..B", "").validate().is_err());
        assert!(FieldSpec::new("", "A", "").validate().is_err());
    }

    #[test]
    fn default_is_optional_in_serde() {
        let spec: FieldSpec =
            serde_json::from_value(json!({ "client_key": "name", "api_key": "Name" }))
                .expect("spec parses");
        assert_eq!(spec.default, Value::Null);
    }
}
