//! Validation error aggregation.
//!
//! A validator reports failures per field path (`user.names.first`,
//! `addresses.0.city`). Clients get one error per top-level field: the
//! first message seen for it, plus the value originally submitted for that
//! field when the submitted input is known.

use crate::message::scalar_to_string;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Ordered field → messages collection produced by a validator.
///
/// Adding the same message twice for a field is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build from `(field, message)` pairs.
    ///
    /// ```
    /// use api_envelope_core::validation::ValidationErrors;
    ///
    /// let errors = ValidationErrors::with_messages([("key", "An error")]);
    /// assert_eq!(errors.first("key"), Some("An error"));
    /// ```
    pub fn with_messages<I, K, V>(messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut errors = Self::new();
        for (field, message) in messages {
            errors.add(field, message);
        }
        errors
    }

    /// Flatten a nested JSON tree of messages.
    ///
    /// Object keys and array indices are joined with `.` to form field
    /// paths; string leaves are messages, other scalars are rendered, and
    /// nulls are skipped. A non-object root yields no errors.
    #[must_use]
    pub fn from_tree(tree: &Value) -> Self {
        let mut errors = Self::new();
        if let Value::Object(map) = tree {
            for (key, value) in map {
                collect_tree(&mut errors, key.clone(), value);
            }
        }
        errors
    }

    /// Record a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, messages)) => {
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
            None => self.fields.push((field, vec![message])),
        }
    }

    /// Whether there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map_or(&[], |(_, messages)| messages.as_slice())
    }

    /// First message recorded for a field.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// Every message, in order.
    #[must_use]
    pub fn all(&self) -> Vec<&str> {
        self.fields
            .iter()
            .flat_map(|(_, messages)| messages.iter().map(String::as_str))
            .collect()
    }

    /// Iterate over `(field, messages)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_slice()))
    }

    /// Flatten to unique `(dot-path, message)` pairs in original order.
    ///
    /// Each message's path is its field path followed by its index.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .enumerate()
                    .map(move |(index, message)| (format!("{field}.{index}"), message.clone()))
            })
            .filter(|pair| seen.insert(pair.clone()))
            .collect()
    }
}

fn collect_tree(errors: &mut ValidationErrors, path: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_tree(errors, format!("{path}.{key}"), child);
            }
        }
        Value::Array(items) => {
            // A list of plain messages belongs to the field itself.
            if items.iter().all(|item| !item.is_object() && !item.is_array()) {
                for item in items {
                    if let Some(message) = scalar_to_string(item) {
                        errors.add(path.clone(), message);
                    }
                }
            } else {
                for (index, child) in items.iter().enumerate() {
                    collect_tree(errors, format!("{path}.{index}"), child);
                }
            }
        }
        scalar => {
            if let Some(message) = scalar_to_string(scalar) {
                errors.add(path, message);
            }
        }
    }
}

/// The surviving error for one top-level field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    /// Top-level field name.
    #[serde(skip)]
    pub field: String,
    /// First message reported for the field.
    pub message: String,
    /// Submitted value; omitted entirely when no input is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_value: Option<Value>,
}

/// Collapse errors to the first one per top-level field.
///
/// The top-level field is the part of the path before the first `.`.
/// With `input`, each entry carries the submitted value for its field
/// (`null` when the field was not submitted).
///
/// # Examples
///
/// ```
/// use api_envelope_core::validation::{aggregate, ValidationErrors};
///
/// let errors = ValidationErrors::with_messages([
///     ("user.first", "required"),
///     ("user.last", "too short"),
///     ("tags.0", "required"),
/// ]);
///
/// let aggregated = aggregate(&errors, None);
/// assert_eq!(aggregated.len(), 2);
/// assert_eq!(aggregated[0].field, "user");
/// assert_eq!(aggregated[0].message, "required");
/// assert_eq!(aggregated[1].field, "tags");
/// ```
#[must_use]
pub fn aggregate(errors: &ValidationErrors, input: Option<&Map<String, Value>>) -> Vec<FieldError> {
    let mut result: Vec<FieldError> = Vec::new();

    for (path, message) in errors.flatten() {
        let field = path.split('.').next().unwrap_or_default();
        if result.iter().any(|entry| entry.field == field) {
            continue;
        }
        result.push(FieldError {
            field: field.to_string(),
            message,
            rejected_value: input.map(|values| values.get(field).cloned().unwrap_or(Value::Null)),
        });
    }

    result
}

/// Render aggregated errors as a field-keyed JSON object.
#[must_use]
pub fn to_data(errors: &[FieldError]) -> Map<String, Value> {
    errors
        .iter()
        .map(|error| {
            let value = serde_json::to_value(error).unwrap_or(Value::Null);
            (error.field.clone(), value)
        })
        .collect()
}

/// Strategy turning validation errors into response data.
///
/// Installed on the envelope builder; replaces the default aggregation
/// entirely and its output is used verbatim.
pub trait ValidationErrorFormatter: Send + Sync {
    /// Format `errors`, with the submitted input when it is known.
    fn format(&self, errors: &ValidationErrors, input: Option<&Map<String, Value>>) -> Value;
}

impl<F> ValidationErrorFormatter for F
where
    F: Fn(&ValidationErrors, Option<&Map<String, Value>>) -> Value + Send + Sync,
{
    fn format(&self, errors: &ValidationErrors, input: Option<&Map<String, Value>>) -> Value {
        self(errors, input)
    }
}

/// Default formatter: one error per top-level field, see [`aggregate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstErrorPerField;

impl ValidationErrorFormatter for FirstErrorPerField {
    fn format(&self, errors: &ValidationErrors, input: Option<&Map<String, Value>>) -> Value {
        Value::Object(to_data(&aggregate(errors, input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: &Value) -> Option<&Map<String, Value>> {
        value.as_object()
    }

    #[test]
    fn test_keeps_first_error_per_top_level_field() {
        let errors = ValidationErrors::with_messages([
            ("user.first", "required"),
            ("user.last", "too short"),
            ("tags.0", "required"),
        ]);

        let aggregated = aggregate(&errors, None);
        let fields: Vec<&str> = aggregated.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["user", "tags"]);
        assert_eq!(aggregated[0].message, "required");
        assert_eq!(aggregated[1].message, "required");
        assert!(aggregated.iter().all(|e| e.rejected_value.is_none()));
    }

    #[test]
    fn test_attaches_submitted_values() {
        let errors = ValidationErrors::with_messages([
            ("user.names.first", "The first name is required."),
            ("user.names.last", "Not less than 3"),
            ("addresses.0.city", "The city is required."),
            ("age", "The age is required."),
        ]);
        let submitted = json!({
            "user": {"names": {"first": null, "last": "O"}},
            "addresses": [{"country": "Nigeria", "city": null}],
        });

        let data = to_data(&aggregate(&errors, input(&submitted)));
        assert_eq!(
            Value::Object(data),
            json!({
                "user": {
                    "message": "The first name is required.",
                    "rejected_value": {"names": {"first": null, "last": "O"}},
                },
                "addresses": {
                    "message": "The city is required.",
                    "rejected_value": [{"country": "Nigeria", "city": null}],
                },
                "age": {"message": "The age is required.", "rejected_value": null},
            })
        );
    }

    #[test]
    fn test_duplicate_messages_are_ignored_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "required");
        errors.add("name", "required");
        errors.add("name", "too long");
        assert_eq!(errors.get("name"), ["required", "too long"]);
        assert_eq!(errors.flatten(), [
            ("name.0".to_string(), "required".to_string()),
            ("name.1".to_string(), "too long".to_string()),
        ]);
    }

    #[test]
    fn test_flattens_nested_trees() {
        let tree = json!({
            "user": {"first": ["required", "alpha"], "last": "too short"},
            "tags": [{"name": "required"}],
            "skip": null,
        });
        let errors = ValidationErrors::from_tree(&tree);
        assert_eq!(errors.get("user.first"), ["required", "alpha"]);
        assert_eq!(errors.first("user.last"), Some("too short"));
        assert_eq!(errors.first("tags.0.name"), Some("required"));
        assert_eq!(errors.len(), 3);
        assert!(ValidationErrors::from_tree(&json!("oops")).is_empty());
    }

    #[test]
    fn test_custom_formatter_output_is_verbatim() {
        let formatter = |errors: &ValidationErrors, _input: Option<&Map<String, Value>>| {
            json!({"error_messages": errors.all()})
        };
        let errors = ValidationErrors::with_messages([("name", "a"), ("age", "b")]);
        assert_eq!(
            formatter.format(&errors, None),
            json!({"error_messages": ["a", "b"]})
        );
    }

    #[test]
    fn test_default_formatter_matches_aggregate() {
        let errors = ValidationErrors::with_messages([("key", "An error")]);
        assert_eq!(
            FirstErrorPerField.format(&errors, None),
            json!({"key": {"message": "An error"}})
        );
    }
}
