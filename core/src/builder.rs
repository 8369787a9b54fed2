//! Envelope assembly.
//!
//! [`EnvelopeBuilder`] is the one place where a status, a message and a
//! payload become an [`ApiResponse`]. The steps, in order:
//!
//! 1. no-content statuses short-circuit to `{}`
//! 2. the payload is normalized (see [`ResponseData::normalize`])
//! 3. the message is parsed and `_attributes` from the payload are merged in
//! 4. the message is translated under the status's domain
//! 5. failed responses pick up an `error_code`
//! 6. the payload is nested under the wrapper key for the status, or merged
//!    into the envelope when there is no wrapper

use crate::config::ResponseConfig;
use crate::data::{Normalized, ResponseData, merge_missing};
use crate::envelope::{
    ApiResponse, ERROR_CODE_FIELD, Envelope, MESSAGE_DATA_FIELD, MESSAGE_FIELD, SUCCESS_FIELD,
};
use crate::error::Result;
use crate::message::{Attributes, MessageIdentifier, scalar_to_string};
use crate::status::ResponseStatus;
use crate::translation::{MessageCatalog, Translator};
use crate::validation::{FirstErrorPerField, ValidationErrorFormatter, ValidationErrors};
use http::HeaderMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Payload field carrying extra translation attributes.
pub const ATTRIBUTES_FIELD: &str = "_attributes";

/// Marker that lets a translated key become the error code.
const ERROR_CODE_MARKER: &str = "error_code.";

/// Message used when wrapping a response carried by a fault.
pub const CARRIED_RESPONSE_MESSAGE: &str = "An error occurred";

/// One response waiting to be assembled.
///
/// ```
/// use api_envelope_core::builder::ResponseDraft;
/// use api_envelope_core::status::ResponseStatus;
/// use serde_json::json;
///
/// let draft = ResponseDraft::new(ResponseStatus::OK)
///     .with_message("example_code")
///     .with_data(json!({"id": 1}))
///     .without_data_wrapper();
/// assert_eq!(draft.status(), ResponseStatus::OK);
/// ```
#[derive(Debug)]
pub struct ResponseDraft {
    status: ResponseStatus,
    message: Option<String>,
    data: ResponseData,
    headers: HeaderMap,
    wrap: bool,
}

impl ResponseDraft {
    /// Start a draft with no message, payload or headers.
    #[must_use]
    pub fn new(status: ResponseStatus) -> Self {
        Self {
            status,
            message: None,
            data: ResponseData::Absent,
            headers: HeaderMap::new(),
            wrap: true,
        }
    }

    /// Set the message or message identifier.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the payload.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<ResponseData>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Merge the payload into the envelope instead of nesting it.
    #[must_use]
    pub const fn without_data_wrapper(mut self) -> Self {
        self.wrap = false;
        self
    }

    /// The draft's status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }
}

/// Builds envelopes from a shared configuration and message catalog.
///
/// Builders are cheap to clone and hold no per-request state.
///
/// # Examples
///
/// ```
/// use api_envelope_core::{EnvelopeBuilder, ResponseConfig, ResponseData};
/// use api_envelope_core::translation::EchoCatalog;
/// use http::HeaderMap;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let builder = EnvelopeBuilder::new(Arc::new(ResponseConfig::default()), Arc::new(EchoCatalog));
///
/// let response = builder
///     .build(400, Some("Bad error"), json!({"error": "Oops!"}), HeaderMap::new())
///     .unwrap();
/// assert_eq!(
///     response.body().clone().into_value(),
///     json!({"success": false, "message": "Bad error", "error": {"error": "Oops!"}})
/// );
///
/// assert!(builder.build(1000, None, ResponseData::Absent, HeaderMap::new()).is_err());
/// ```
#[derive(Clone)]
pub struct EnvelopeBuilder {
    config: Arc<ResponseConfig>,
    translator: Translator,
    formatter: Arc<dyn ValidationErrorFormatter>,
}

impl fmt::Debug for EnvelopeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeBuilder")
            .field("config", &self.config)
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self {
            config: Arc::new(ResponseConfig::default()),
            translator: Translator::default(),
            formatter: Arc::new(FirstErrorPerField),
        }
    }
}

impl EnvelopeBuilder {
    /// Create a builder over a configuration and catalog.
    #[must_use]
    pub fn new(config: Arc<ResponseConfig>, catalog: Arc<dyn MessageCatalog>) -> Self {
        Self {
            config,
            translator: Translator::new(catalog),
            formatter: Arc::new(FirstErrorPerField),
        }
    }

    /// Replace the validation-error formatting strategy.
    #[must_use]
    pub fn with_validation_formatter(
        mut self,
        formatter: impl ValidationErrorFormatter + 'static,
    ) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    /// The translator in use.
    #[must_use]
    pub const fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Validate `status` and build a wrapped response.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EnvelopeError::InvalidStatusCode`] when `status` is
    /// not a registered HTTP status.
    pub fn build(
        &self,
        status: u16,
        message: Option<&str>,
        data: impl Into<ResponseData>,
        headers: HeaderMap,
    ) -> Result<ApiResponse> {
        let status = ResponseStatus::new(status)?;
        let draft = ResponseDraft {
            message: message.map(str::to_string),
            ..ResponseDraft::new(status)
        };
        Ok(self.assemble(draft.with_data(data).with_headers(headers)))
    }

    /// Assemble a draft into a response.
    #[must_use]
    pub fn assemble(&self, draft: ResponseDraft) -> ApiResponse {
        let ResponseDraft {
            status,
            message,
            data,
            headers,
            wrap,
        } = draft;

        if self.config.is_no_content(status) {
            tracing::debug!(status = status.code(), "Built empty envelope");
            return ApiResponse::new(status, headers, Envelope::empty());
        }

        let raw_message = message.unwrap_or_default();
        let mut data = data.normalize();

        let identifier = MessageIdentifier::parse(&raw_message);
        let mut attributes = identifier.attributes;
        if let Some(extra) = take_attributes(&mut data) {
            attributes.merge(extra);
        }

        let translation = self.translator.resolve(
            &identifier.name,
            &attributes,
            Some(self.config.domain_for(status)),
        );

        let error_code = if status.is_success() {
            None
        } else {
            take_error_code(&mut data).or_else(|| {
                translation
                    .key
                    .clone()
                    .filter(|_| raw_message.contains(ERROR_CODE_MARKER))
            })
        };

        let message = if translation.message.is_empty() {
            raw_message
        } else {
            translation.message
        };

        let mut body = Map::new();
        body.insert(SUCCESS_FIELD.to_string(), Value::Bool(status.is_success()));
        body.insert(MESSAGE_FIELD.to_string(), Value::String(message));
        if let Some(code) = error_code {
            body.insert(ERROR_CODE_FIELD.to_string(), Value::String(code));
        }

        let wrapper = if wrap {
            self.config.data_wrappers.resolve(status)
        } else {
            None
        };
        place_data(&mut body, data, wrapper);

        tracing::debug!(
            status = status.code(),
            wrapper = wrapper.unwrap_or("-"),
            translated = translation.key.is_some(),
            "Built envelope"
        );

        ApiResponse::new(status, headers, Envelope::from_map(body))
    }

    /// Re-shape an existing JSON response into an envelope.
    ///
    /// A non-object body is kept under `message_data`. The envelope message
    /// is `message` when it is non-empty; otherwise the body's own `message`
    /// field is pulled out and used, falling back to the status text. The
    /// payload is only nested when `wrap` is set.
    #[must_use]
    pub fn from_json_response(
        &self,
        status: ResponseStatus,
        headers: HeaderMap,
        body: Value,
        message: Option<&str>,
        wrap: bool,
    ) -> ApiResponse {
        let mut data = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert(MESSAGE_DATA_FIELD.to_string(), other);
                map
            }
        };

        let message = match message.filter(|m| !m.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => data
                .shift_remove(MESSAGE_FIELD)
                .as_ref()
                .and_then(scalar_to_string)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status.status_text().to_string()),
        };

        let mut draft = ResponseDraft::new(status)
            .with_message(message)
            .with_data(data)
            .with_headers(headers);
        if !wrap {
            draft = draft.without_data_wrapper();
        }
        self.assemble(draft)
    }

    /// Build a validation-failure response.
    ///
    /// Uses the configured validation status, and the configured default
    /// message unless `message` is given. The payload comes from the
    /// installed [`ValidationErrorFormatter`].
    #[must_use]
    pub fn from_failed_validation(
        &self,
        errors: &ValidationErrors,
        input: Option<&Map<String, Value>>,
        message: Option<&str>,
    ) -> ApiResponse {
        let status = self.validation_status();
        let message = message.unwrap_or(&self.config.validation.message);
        let data = self.formatter.format(errors, input);

        self.assemble(
            ResponseDraft::new(status)
                .with_message(message)
                .with_data(data),
        )
    }

    fn validation_status(&self) -> ResponseStatus {
        let code = self.config.validation.status;
        ResponseStatus::new(code).unwrap_or_else(|_| {
            tracing::warn!(code, "Configured validation status is not registered, using 422");
            ResponseStatus::UNPROCESSABLE_ENTITY
        })
    }
}

fn take_attributes(data: &mut Normalized) -> Option<Attributes> {
    let Normalized::Mapping(map) = data else {
        return None;
    };
    match map.shift_remove(ATTRIBUTES_FIELD)? {
        Value::Object(extra) => Some(Attributes::from_json(&extra)),
        _ => None,
    }
}

fn take_error_code(data: &mut Normalized) -> Option<String> {
    let Normalized::Mapping(map) = data else {
        return None;
    };
    let value = map.shift_remove(ERROR_CODE_FIELD)?;
    Some(match value {
        Value::Null => String::new(),
        Value::Bool(b) => String::from(if b { "1" } else { "0" }),
        other => scalar_to_string(&other).unwrap_or_else(|| other.to_string()),
    })
}

fn place_data(body: &mut Map<String, Value>, data: Normalized, wrapper: Option<&str>) {
    if data.is_blank() {
        return;
    }

    match (wrapper, data) {
        (Some(key), data) => {
            body.insert(key.to_string(), data.into_value());
        }
        (None, Normalized::Mapping(map)) => merge_missing(body, map),
        (None, other) => {
            body.entry(MESSAGE_DATA_FIELD.to_string())
                .or_insert_with(|| other.into_value());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::status::WrapperTable;
    use serde_json::json;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_group(
                None,
                "errors",
                json!({
                    "example_code": "Example Error",
                    "error_code": {"error_code_name": "Example error message with :attribute"},
                }),
            )
            .with_group(
                None,
                "success",
                json!({"example_code": "Example success message, :status"}),
            )
    }

    fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::new(Arc::new(ResponseConfig::default()), Arc::new(catalog()))
    }

    fn body(response: &ApiResponse) -> Value {
        response.body().clone().into_value()
    }

    #[test]
    fn test_no_content_ignores_message_and_data() {
        let response = builder()
            .build(204, Some("example_code"), json!({"a": 1}), HeaderMap::new())
            .unwrap();
        assert!(response.body().is_empty());
        assert_eq!(response.status(), ResponseStatus::NO_CONTENT);
    }

    #[test]
    fn test_literal_message_without_data() {
        let response = builder()
            .build(200, Some("A successful message"), ResponseData::Absent, HeaderMap::new())
            .unwrap();
        assert_eq!(
            body(&response),
            json!({"success": true, "message": "A successful message"})
        );
    }

    #[test]
    fn test_error_code_from_translated_identifier() {
        let response = builder()
            .build(
                400,
                Some("error_code.error_code_name:attribute=yes"),
                ResponseData::Absent,
                HeaderMap::new(),
            )
            .unwrap();
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "message": "Example error message with yes",
                "error_code": "error_code_name",
            })
        );
    }

    #[test]
    fn test_translated_key_without_marker_is_not_an_error_code() {
        let response = builder()
            .build(400, Some("example_code"), ResponseData::Absent, HeaderMap::new())
            .unwrap();
        assert_eq!(response.body().message(), Some("Example Error"));
        assert_eq!(response.body().error_code(), None);
    }

    #[test]
    fn test_data_error_code_wins_over_translated_key() {
        let response = builder()
            .build(
                400,
                Some("error_code.error_code_name"),
                json!({"error_code": 42, "detail": "x"}),
                HeaderMap::new(),
            )
            .unwrap();
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "message": "Example error message with :attribute",
                "error_code": "42",
                "error": {"detail": "x"},
            })
        );
    }

    #[test]
    fn test_success_responses_keep_error_code_in_data() {
        let response = builder()
            .build(200, Some("Done"), json!({"error_code": "x"}), HeaderMap::new())
            .unwrap();
        assert_eq!(response.body().error_code(), None);
        assert_eq!(response.body().get("data"), Some(&json!({"error_code": "x"})));
    }

    #[test]
    fn test_data_attributes_override_inline_ones() {
        let response = builder()
            .build(
                200,
                Some("example_code:status=inline"),
                json!({"_attributes": {"status": "from data"}, "id": 7}),
                HeaderMap::new(),
            )
            .unwrap();
        assert_eq!(
            body(&response),
            json!({
                "success": true,
                "message": "Example success message, from data",
                "data": {"id": 7},
            })
        );
    }

    #[test]
    fn test_only_attributes_leaves_no_payload() {
        let response = builder()
            .build(
                200,
                Some("example_code"),
                json!({"_attributes": {"status": "ok"}}),
                HeaderMap::new(),
            )
            .unwrap();
        assert_eq!(
            body(&response),
            json!({"success": true, "message": "Example success message, ok"})
        );
    }

    #[test]
    fn test_wrapper_keys_follow_status() {
        let b = builder();
        let data = || json!({"k": "v"});
        for (status, key) in [(200, "data"), (201, "data"), (404, "error"), (422, "errors"), (503, "error")] {
            let response = b.build(status, Some("m"), data(), HeaderMap::new()).unwrap();
            assert_eq!(response.body().get(key), Some(&data()), "status {status}");
        }
    }

    #[test]
    fn test_unwrapped_mapping_merges_without_overwriting() {
        let response = builder().assemble(
            ResponseDraft::new(ResponseStatus::OK)
                .with_message("Hello")
                .with_data(json!({"success": "nope", "id": 1}))
                .without_data_wrapper(),
        );
        assert_eq!(body(&response), json!({"success": true, "message": "Hello", "id": 1}));
    }

    #[test]
    fn test_unwrapped_scalar_goes_under_message_data() {
        let response = builder().assemble(
            ResponseDraft::new(ResponseStatus::OK)
                .with_message("Hello")
                .with_data("text")
                .without_data_wrapper(),
        );
        assert_eq!(response.body().get("message_data"), Some(&json!("text")));
    }

    #[test]
    fn test_no_matching_wrapper_merges() {
        let config = ResponseConfig::default()
            .with_data_wrappers(WrapperTable::from_pairs([("2xx", "data")]).unwrap());
        let builder = EnvelopeBuilder::new(Arc::new(config), Arc::new(catalog()));
        let response = builder
            .build(404, Some("Missing"), json!({"id": 3}), HeaderMap::new())
            .unwrap();
        assert_eq!(
            body(&response),
            json!({"success": false, "message": "Missing", "id": 3})
        );
    }

    #[test]
    fn test_blank_payloads_add_nothing() {
        let b = builder();
        for data in [json!({}), json!([]), json!("   "), Value::Null] {
            let response = b.build(200, Some("m"), data, HeaderMap::new()).unwrap();
            assert_eq!(response.body().as_map().len(), 2);
        }
    }

    #[test]
    fn test_headers_are_kept() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "abc".parse().unwrap());
        let response = builder()
            .build(200, Some("m"), ResponseData::Absent, headers)
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc");
    }

    #[test]
    fn test_json_response_pulls_message() {
        let response = builder().from_json_response(
            ResponseStatus::OK,
            HeaderMap::new(),
            json!({"message": "From body", "name": "Jane"}),
            None,
            false,
        );
        assert_eq!(
            body(&response),
            json!({"success": true, "message": "From body", "name": "Jane"})
        );
    }

    #[test]
    fn test_json_response_explicit_message_and_wrapping() {
        let response = builder().from_json_response(
            ResponseStatus::BAD_REQUEST,
            HeaderMap::new(),
            json!({"message": "kept", "field": 1}),
            Some("An error occurred"),
            true,
        );
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "message": "An error occurred",
                "error": {"message": "kept", "field": 1},
            })
        );
    }

    #[test]
    fn test_json_response_scalar_body_and_status_text() {
        let response = builder().from_json_response(
            ResponseStatus::NOT_FOUND,
            HeaderMap::new(),
            json!("raw"),
            Some(""),
            false,
        );
        assert_eq!(
            body(&response),
            json!({"success": false, "message": "Not Found", "message_data": "raw"})
        );
    }

    #[test]
    fn test_failed_validation_uses_configured_defaults() {
        let errors = ValidationErrors::with_messages([("name", "The name field is required.")]);
        let input = json!({"name": ""});
        let response = builder().from_failed_validation(&errors, input.as_object(), None);

        assert_eq!(response.status(), ResponseStatus::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "message": "validation_failed",
                "errors": {
                    "name": {"message": "The name field is required.", "rejected_value": ""},
                },
            })
        );
    }

    #[test]
    fn test_failed_validation_with_custom_formatter() {
        let config = ResponseConfig::default().with_validation(400, "Invalid input");
        let builder = EnvelopeBuilder::new(Arc::new(config), Arc::new(catalog()))
            .with_validation_formatter(
                |errors: &ValidationErrors, _input: Option<&Map<String, Value>>| {
                    json!({"error_messages": errors.all()})
                },
            );

        let errors = ValidationErrors::with_messages([("a", "one"), ("b", "two")]);
        let response = builder.from_failed_validation(&errors, None, None);

        assert_eq!(response.status(), ResponseStatus::BAD_REQUEST);
        assert_eq!(
            body(&response),
            json!({
                "success": false,
                "message": "Invalid input",
                "error": {"error_messages": ["one", "two"]},
            })
        );
    }

    #[test]
    fn test_unregistered_validation_status_falls_back() {
        let config = ResponseConfig::default().with_validation(999, "m");
        let builder = EnvelopeBuilder::new(Arc::new(config), Arc::new(catalog()));
        let response = builder.from_failed_validation(&ValidationErrors::new(), None, None);
        assert_eq!(response.status(), ResponseStatus::UNPROCESSABLE_ENTITY);
    }
}
