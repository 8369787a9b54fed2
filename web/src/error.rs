//! Fault types raised by handlers.
//!
//! A [`Fault`] is anything a handler can bail out with. Each variant is a
//! category the classifier knows how to turn into an envelope; anything it
//! doesn't know goes in [`Fault::Unclassified`].
//!
//! # Examples
//!
//! ```
//! use api_envelope_web::Fault;
//!
//! fn find_user(id: u64) -> Result<String, Fault> {
//!     Err(Fault::model_not_found("User", [id]))
//! }
//!
//! let fault = find_user(7).unwrap_err();
//! assert_eq!(fault.to_string(), "No query results for model [User] 7");
//! ```

use api_envelope_core::{ResponseStatus, ValidationErrors};
use http::HeaderMap;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Failure raised by a handler.
#[derive(Debug, Error)]
pub enum Fault {
    /// A route or resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A model lookup returned no results.
    #[error("No query results for model [{model}]{ids}")]
    ModelNotFound {
        /// Model name.
        model: String,
        /// Identifiers that were looked up.
        ids: ModelIds,
    },

    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthenticated(String),

    /// The caller may not perform the action.
    #[error("{0}")]
    Unauthorized(String),

    /// A failure with an explicit HTTP status.
    #[error(transparent)]
    Http(HttpFault),

    /// A failure carrying a pre-built response.
    #[error(transparent)]
    Response(CarriedResponse),

    /// Input validation failed.
    #[error(transparent)]
    Validation(ValidationFault),

    /// Anything else.
    #[error(transparent)]
    Unclassified(anyhow::Error),
}

impl Fault {
    /// A not-found fault.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// A model-not-found fault.
    #[must_use]
    pub fn model_not_found<I, T>(model: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        Self::ModelNotFound {
            model: model.into(),
            ids: ModelIds(ids.into_iter().map(|id| id.to_string()).collect()),
        }
    }

    /// An authentication fault.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// An authorization fault.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// A fault with an explicit status.
    #[must_use]
    pub fn http(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self::Http(HttpFault::new(status).with_message(message))
    }

    /// A validation fault from `(field, message)` pairs.
    #[must_use]
    pub fn validation<I, K, V>(messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Validation(ValidationFault::new(ValidationErrors::with_messages(messages)))
    }
}

impl From<anyhow::Error> for Fault {
    fn from(error: anyhow::Error) -> Self {
        Self::Unclassified(error)
    }
}

impl From<HttpFault> for Fault {
    fn from(fault: HttpFault) -> Self {
        Self::Http(fault)
    }
}

impl From<CarriedResponse> for Fault {
    fn from(response: CarriedResponse) -> Self {
        Self::Response(response)
    }
}

impl From<ValidationFault> for Fault {
    fn from(fault: ValidationFault) -> Self {
        Self::Validation(fault)
    }
}

/// Identifiers of a failed model lookup, rendered as ` 1, 2`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelIds(pub Vec<String>);

impl fmt::Display for ModelIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, " {}", self.0.join(", "))
    }
}

/// A failure with an explicit status, headers and optional error payload.
#[derive(Clone, Debug)]
pub struct HttpFault {
    status: ResponseStatus,
    message: String,
    headers: HeaderMap,
    error_data: Option<Value>,
}

impl HttpFault {
    /// A fault with no message.
    #[must_use]
    pub fn new(status: ResponseStatus) -> Self {
        Self {
            status,
            message: String::new(),
            headers: HeaderMap::new(),
            error_data: None,
        }
    }

    /// Set the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a structured error payload.
    #[must_use]
    pub fn with_error_data(mut self, data: Value) -> Self {
        self.error_data = Some(data);
        self
    }

    /// The status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// The message, possibly empty.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The structured error payload.
    #[must_use]
    pub const fn error_data(&self) -> Option<&Value> {
        self.error_data.as_ref()
    }
}

impl fmt::Display for HttpFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(self.status.status_text())
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for HttpFault {}

/// Body of a carried response.
#[derive(Clone, Debug, PartialEq)]
pub enum CarriedBody {
    /// A JSON document.
    Json(Value),
    /// Anything else, as text.
    Raw(String),
}

/// A fault carrying a response that was already built.
#[derive(Clone, Debug)]
pub struct CarriedResponse {
    status: ResponseStatus,
    headers: HeaderMap,
    body: CarriedBody,
}

impl CarriedResponse {
    /// Carry a JSON response.
    #[must_use]
    pub fn json(status: ResponseStatus, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: CarriedBody::Json(body),
        }
    }

    /// Carry a non-JSON response.
    #[must_use]
    pub fn raw(status: ResponseStatus, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: CarriedBody::Raw(body.into()),
        }
    }

    /// Set response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// The status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// The headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body.
    #[must_use]
    pub const fn body(&self) -> &CarriedBody {
        &self.body
    }
}

impl fmt::Display for CarriedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Carried response with status {}", self.status)
    }
}

impl std::error::Error for CarriedResponse {}

/// Failed input validation.
#[derive(Clone, Debug)]
pub struct ValidationFault {
    errors: ValidationErrors,
    input: Option<Map<String, Value>>,
    message: Option<String>,
}

impl ValidationFault {
    /// Wrap validator output.
    #[must_use]
    pub const fn new(errors: ValidationErrors) -> Self {
        Self {
            errors,
            input: None,
            message: None,
        }
    }

    /// Attach the submitted input.
    #[must_use]
    pub fn with_input(mut self, input: Map<String, Value>) -> Self {
        self.input = Some(input);
        self
    }

    /// Override the configured validation message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The errors.
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// The submitted input, if known.
    #[must_use]
    pub const fn input(&self) -> Option<&Map<String, Value>> {
        self.input.as_ref()
    }

    /// The explicit message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for ValidationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or("The given data was invalid."))
    }
}

impl std::error::Error for ValidationFault {}
