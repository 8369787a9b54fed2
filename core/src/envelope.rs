//! The envelope returned to clients and the response that carries it.

use crate::status::ResponseStatus;
use http::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field holding the success flag.
pub const SUCCESS_FIELD: &str = "success";
/// Field holding the resolved message.
pub const MESSAGE_FIELD: &str = "message";
/// Field holding the error code of failed responses.
pub const ERROR_CODE_FIELD: &str = "error_code";
/// Field holding unwrapped non-object data.
pub const MESSAGE_DATA_FIELD: &str = "message_data";

/// Top-level JSON object sent to the client.
///
/// Field order is significant and preserved: `success`, `message`, then
/// `error_code` when present, then data.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    /// The empty `{}` body used for no-content statuses.
    #[must_use]
    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub(crate) const fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The success flag, absent for no-content bodies.
    #[must_use]
    pub fn success(&self) -> Option<bool> {
        self.0.get(SUCCESS_FIELD).and_then(Value::as_bool)
    }

    /// The resolved message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.0.get(MESSAGE_FIELD).and_then(Value::as_str)
    }

    /// The error code, if one was attached.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.0.get(ERROR_CODE_FIELD).and_then(Value::as_str)
    }

    /// Any top-level field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether the body is `{}`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the fields.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A finished response: status, headers and envelope body.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    status: ResponseStatus,
    headers: HeaderMap,
    body: Envelope,
}

impl ApiResponse {
    pub(crate) const fn new(status: ResponseStatus, headers: HeaderMap, body: Envelope) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// The response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The envelope body.
    #[must_use]
    pub const fn body(&self) -> &Envelope {
        &self.body
    }

    /// Split into parts.
    #[must_use]
    pub fn into_parts(self) -> (ResponseStatus, HeaderMap, Envelope) {
        (self.status, self.headers, self.body)
    }
}
