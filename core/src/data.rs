//! Response payloads and their normalization.
//!
//! Handlers hand the envelope builder many kinds of values: plain JSON,
//! resources, objects that render their own JSON text, serde types,
//! collections and anonymous records. [`ResponseData`] is the closed set of
//! those shapes; [`ResponseData::normalize`] turns any of them into a
//! [`Normalized`] payload by dispatching on the variant in a fixed priority
//! order.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A value that resolves to a JSON object, optionally with top-level extras.
///
/// Mirrors an API resource: `resolve` produces the resource fields, while
/// `with` and `additional` contribute siblings of the wrapped fields when
/// the resource is rendered as a full document.
pub trait JsonResource: Send {
    /// The resource fields.
    fn resolve(&self) -> Map<String, Value>;

    /// Extra top-level fields contributed by the resource itself.
    fn with(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Extra top-level fields attached by the caller.
    fn additional(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Key the fields are nested under in a document; `None` merges them.
    fn wrap(&self) -> Option<&str> {
        Some("data")
    }
}

/// Render a resource as a full JSON document.
///
/// The resolved fields go under [`JsonResource::wrap`] (or straight into the
/// document when it is `None`); `with` and then `additional` are merged
/// after them, never replacing earlier keys.
#[must_use]
pub fn resource_document(resource: &dyn JsonResource) -> Map<String, Value> {
    let mut document = match resource.wrap() {
        Some(key) => {
            let mut doc = Map::new();
            doc.insert(key.to_string(), Value::Object(resource.resolve()));
            doc
        }
        None => resource.resolve(),
    };
    merge_missing(&mut document, resource.with());
    merge_missing(&mut document, resource.additional());
    document
}

/// A value that renders itself as JSON text.
pub trait Jsonable: Send {
    /// The JSON text.
    fn to_json(&self) -> String;
}

/// A value that renders itself as a JSON value.
pub trait JsonSerializable: Send {
    /// The JSON value.
    fn json_serialize(&self) -> Value;
}

/// A value convertible to a JSON array or object.
pub trait Arrayable: Send {
    /// The converted value.
    fn to_array(&self) -> Value;
}

struct SerdeValue<T>(T);

impl<T: Serialize + Send> JsonSerializable for SerdeValue<T> {
    fn json_serialize(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or_else(|error| {
            tracing::warn!(%error, "Response data failed to serialize");
            Value::Null
        })
    }
}

/// Payload handed to the envelope builder.
#[derive(Default)]
pub enum ResponseData {
    /// No payload.
    #[default]
    Absent,
    /// A plain JSON object.
    Mapping(Map<String, Value>),
    /// A plain JSON array.
    Sequence(Vec<Value>),
    /// An API resource; converted with [`JsonResource::resolve`].
    Resource(Box<dyn JsonResource>),
    /// A value producing JSON text; the text is parsed.
    JsonProducing(Box<dyn Jsonable>),
    /// A value producing a JSON value.
    SelfSerializing(Box<dyn JsonSerializable>),
    /// A value convertible to an array or object.
    ArrayConvertible(Box<dyn Arrayable>),
    /// An anonymous record: ordered field/value pairs.
    Record(Vec<(String, Value)>),
    /// Anything else: passed through unconverted.
    Scalar(Value),
}

impl fmt::Debug for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Mapping(map) => f.debug_tuple("Mapping").field(map).finish(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::Resource(_) => f.write_str("Resource(..)"),
            Self::JsonProducing(_) => f.write_str("JsonProducing(..)"),
            Self::SelfSerializing(_) => f.write_str("SelfSerializing(..)"),
            Self::ArrayConvertible(_) => f.write_str("ArrayConvertible(..)"),
            Self::Record(fields) => f.debug_tuple("Record").field(fields).finish(),
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
        }
    }
}

impl ResponseData {
    /// Wrap an API resource.
    pub fn resource(resource: impl JsonResource + 'static) -> Self {
        Self::Resource(Box::new(resource))
    }

    /// Wrap a value producing JSON text.
    pub fn json_text(value: impl Jsonable + 'static) -> Self {
        Self::JsonProducing(Box::new(value))
    }

    /// Wrap any serde-serializable value.
    pub fn serializable<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Self::SelfSerializing(Box::new(SerdeValue(value)))
    }

    /// Wrap a value convertible to an array or object.
    pub fn arrayable(value: impl Arrayable + 'static) -> Self {
        Self::ArrayConvertible(Box::new(value))
    }

    /// Build an anonymous record.
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convert to a plain payload.
    ///
    /// Plain mappings, sequences and absence pass through; capabilities are
    /// converted in the order resource, JSON text, self-serializing,
    /// array-convertible, record; scalars pass through unchanged.
    #[must_use]
    pub fn normalize(self) -> Normalized {
        match self {
            Self::Absent => Normalized::Absent,
            Self::Mapping(map) => Normalized::Mapping(map),
            Self::Sequence(items) => Normalized::Sequence(items),
            Self::Resource(resource) => Normalized::Mapping(resource.resolve()),
            Self::JsonProducing(value) => {
                let text = value.to_json();
                match serde_json::from_str::<Value>(&text) {
                    Ok(parsed) => Normalized::from(parsed),
                    Err(error) => {
                        tracing::warn!(%error, "Response data produced invalid JSON");
                        Normalized::Absent
                    }
                }
            }
            Self::SelfSerializing(value) => Normalized::from(value.json_serialize()),
            Self::ArrayConvertible(value) => Normalized::from(value.to_array()),
            Self::Record(fields) => Normalized::Mapping(fields.into_iter().collect()),
            Self::Scalar(value) => Normalized::Scalar(value),
        }
    }
}

impl From<Value> for ResponseData {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Object(map) => Self::Mapping(map),
            Value::Array(items) => Self::Sequence(items),
            scalar => Self::Scalar(scalar),
        }
    }
}

impl From<Map<String, Value>> for ResponseData {
    fn from(map: Map<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

impl From<Vec<Value>> for ResponseData {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl<T: Into<Self>> From<Option<T>> for ResponseData {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl From<&str> for ResponseData {
    fn from(value: &str) -> Self {
        Self::Scalar(Value::String(value.to_string()))
    }
}

impl From<String> for ResponseData {
    fn from(value: String) -> Self {
        Self::Scalar(Value::String(value))
    }
}

impl From<bool> for ResponseData {
    fn from(value: bool) -> Self {
        Self::Scalar(Value::Bool(value))
    }
}

impl From<i64> for ResponseData {
    fn from(value: i64) -> Self {
        Self::Scalar(Value::from(value))
    }
}

/// A payload after normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum Normalized {
    /// Nothing to emit.
    Absent,
    /// A JSON object.
    Mapping(Map<String, Value>),
    /// A JSON array.
    Sequence(Vec<Value>),
    /// Any other JSON value.
    Scalar(Value),
}

impl Normalized {
    /// Whether the payload contributes nothing to an envelope.
    ///
    /// Absence, empty objects and arrays, and whitespace-only strings are blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Mapping(map) => map.is_empty(),
            Self::Sequence(items) => items.is_empty(),
            Self::Scalar(Value::String(s)) => s.trim().is_empty(),
            Self::Scalar(_) => false,
        }
    }

    /// Convert back to a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Absent => Value::Null,
            Self::Mapping(map) => Value::Object(map),
            Self::Sequence(items) => Value::Array(items),
            Self::Scalar(value) => value,
        }
    }
}

impl From<Value> for Normalized {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Object(map) => Self::Mapping(map),
            Value::Array(items) => Self::Sequence(items),
            scalar => Self::Scalar(scalar),
        }
    }
}

/// Insert each entry of `extra` whose key is not already present.
pub(crate) fn merge_missing(target: &mut Map<String, Value>, extra: Map<String, Value>) {
    for (key, value) in extra {
        target.entry(key).or_insert(value);
    }
}
