//! Message identifiers: the compact `namespace::name:key=value|key=value` grammar.
//!
//! A message passed to the envelope builder is either a literal sentence or
//! a lookup identifier with inline parameters. Both travel through the same
//! grammar; a literal simply never resolves in the catalog.
//!
//! ```text
//! api::errors.quota:limit=10|unit=requests
//! └─┬─┘└────┬─────┘└──────────┬──────────┘
//! namespace  name          attributes
//! ```
//!
//! Parsing and writing are a tokenizer/writer pair: `stringify` form-encodes
//! keys and values and `parse` decodes them, so
//! `MessageIdentifier::parse(&stringify(name, attrs))` gives back the input
//! for any non-empty keys and values free of `|` and `=`.

use serde_json::{Map, Value};
use std::fmt;

const NAMESPACE_SEPARATOR: &str = "::";
const PARAMETER_SEPARATOR: char = ':';
const PAIR_SEPARATOR: char = '|';
const KEY_VALUE_SEPARATOR: char = '=';

/// Ordered string attributes used for placeholder substitution.
///
/// Insertion order is preserved. Inserting an existing key replaces its
/// value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merge `other` into `self`; values from `other` win on collision.
    pub fn merge(&mut self, other: Self) {
        for (key, value) in other.0 {
            self.insert(key, value);
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build attributes from a JSON object, keeping only scalar values.
    ///
    /// Strings are used as-is, numbers and booleans are rendered, and
    /// nulls, arrays and objects are skipped.
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Self {
        map.iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

/// Render a scalar JSON value as a string; `None` for null and containers.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A parsed message: lookup name plus inline attributes.
///
/// # Examples
///
/// ```
/// use api_envelope_core::message::MessageIdentifier;
///
/// let id = MessageIdentifier::parse("api::errors.quota:limit=10|unit=requests");
/// assert_eq!(id.name, "api::errors.quota");
/// assert_eq!(id.attributes.get("limit"), Some("10"));
/// assert_eq!(id.attributes.get("unit"), Some("requests"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageIdentifier {
    /// Lookup name, including any `namespace::` prefix.
    pub name: String,
    /// Inline attributes from the parameter block.
    pub attributes: Attributes,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Segment {
    Name,
    Key,
    Value,
}

impl MessageIdentifier {
    /// Create an identifier from its parts.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Parse a raw message string.
    ///
    /// Parsing never fails: input without a parameter block is a bare name.
    /// Attribute keys and values are form-decoded (`+` is a space, `%XX` a
    /// byte); malformed escapes are kept as written.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (namespace, rest) = match raw.find(NAMESPACE_SEPARATOR) {
            Some(index) => raw.split_at(index + NAMESPACE_SEPARATOR.len()),
            None => ("", raw),
        };

        let mut name = String::from(namespace);
        let mut attributes = Attributes::new();
        let mut segment = Segment::Name;
        let mut key = String::new();
        let mut value = String::new();
        let mut pair_len = 0_usize;

        for ch in rest.chars() {
            match (segment, ch) {
                (Segment::Name, PARAMETER_SEPARATOR) => segment = Segment::Key,
                (Segment::Name, _) => name.push(ch),
                (Segment::Key | Segment::Value, PAIR_SEPARATOR) => {
                    if pair_len > 0 {
                        attributes.insert(decode(&key), decode(&value));
                    }
                    key.clear();
                    value.clear();
                    pair_len = 0;
                    segment = Segment::Key;
                }
                (Segment::Key, KEY_VALUE_SEPARATOR) => {
                    pair_len += 1;
                    segment = Segment::Value;
                }
                (Segment::Key, _) => {
                    pair_len += 1;
                    key.push(ch);
                }
                (Segment::Value, _) => {
                    pair_len += 1;
                    value.push(ch);
                }
            }
        }

        if pair_len > 0 {
            attributes.insert(decode(&key), decode(&value));
        }

        Self { name, attributes }
    }
}

impl From<&str> for MessageIdentifier {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for MessageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        f.write_str(&stringify(&self.name, &map))
    }
}

/// Write a name and attributes back into the message grammar.
///
/// Returns `name` unchanged when `attributes` is empty or holds any array or
/// object value. Null values are skipped and booleans render as `1`/`0`.
/// Keys and values are form-URL-encoded; trailing `=`, `:` and `|` are
/// trimmed from the result.
///
/// # Examples
///
/// ```
/// use api_envelope_core::message::stringify;
/// use serde_json::json;
///
/// let attrs = json!({"key1": "value1", "key2": "value2"});
/// let attrs = attrs.as_object().unwrap();
/// assert_eq!(stringify("string", attrs), "string:key1=value1|key2=value2");
/// ```
#[must_use]
pub fn stringify(name: &str, attributes: &Map<String, Value>) -> String {
    if attributes.is_empty()
        || attributes
            .values()
            .any(|v| matches!(v, Value::Array(_) | Value::Object(_)))
    {
        return name.to_string();
    }

    let pairs: Vec<String> = attributes
        .iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::Null => return None,
                Value::Bool(b) => String::from(if *b { "1" } else { "0" }),
                other => scalar_to_string(other)?,
            };
            Some(format!("{}{KEY_VALUE_SEPARATOR}{}", encode(key), encode(&rendered)))
        })
        .collect();

    let joined = pairs.join(&PAIR_SEPARATOR.to_string());
    format!("{name}{PARAMETER_SEPARATOR}{joined}")
        .trim_end_matches([KEY_VALUE_SEPARATOR, PARAMETER_SEPARATOR, PAIR_SEPARATOR])
        .to_string()
}

fn encode(input: &str) -> String {
    url::form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

fn decode(input: &str) -> String {
    let spaced = input.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
