//! The response surface handlers use.
//!
//! A [`Responder`] wraps an [`EnvelopeBuilder`] with one method per common
//! response, and turns [`Fault`]s into envelopes. It is cheap to clone and
//! meant to live in router state.
//!
//! # Example
//!
//! ```
//! use api_envelope_web::{ApiReply, Fault, Responder};
//! use axum::{extract::State, routing::get, Router};
//! use serde_json::json;
//!
//! async fn show(State(responder): State<Responder>) -> Result<ApiReply, Fault> {
//!     Ok(responder.ok("Found it", json!({"id": 1})))
//! }
//!
//! let app: Router = Router::new()
//!     .route("/things/1", get(show))
//!     .with_state(Responder::default());
//! ```

use crate::classify::{Classified, classify};
use crate::error::{CarriedBody, Fault, HttpFault, ValidationFault};
use crate::report::{FailureReporter, FallbackRenderer, HtmlFallback, TracingReporter};
use api_envelope_core::data::resource_document;
use api_envelope_core::{
    ApiResponse, EnvelopeBuilder, JsonResource, ResourceCollection, ResponseData, ResponseDraft,
    ResponseStatus, ValidationErrors, builder::CARRIED_RESPONSE_MESSAGE,
};
use axum::Json;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;

/// Message of unclassified server errors.
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// A built envelope response, ready to return from a handler.
#[derive(Clone, Debug)]
pub struct ApiReply(ApiResponse);

impl ApiReply {
    /// The underlying response.
    #[must_use]
    pub const fn response(&self) -> &ApiResponse {
        &self.0
    }

    /// Unwrap the underlying response.
    #[must_use]
    pub fn into_inner(self) -> ApiResponse {
        self.0
    }
}

impl From<ApiResponse> for ApiReply {
    fn from(response: ApiResponse) -> Self {
        Self(response)
    }
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        let (status, mut headers, body) = self.0.into_parts();
        headers.remove(header::CONTENT_TYPE);
        headers.remove(header::CONTENT_LENGTH);

        let mut response = (StatusCode::from(status), Json(body)).into_response();
        response.headers_mut().extend(headers);
        response
    }
}

/// Builds envelope responses and renders faults.
#[derive(Clone)]
pub struct Responder {
    builder: EnvelopeBuilder,
    reporter: Arc<dyn FailureReporter>,
    fallback: Arc<dyn FallbackRenderer>,
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(EnvelopeBuilder::default())
    }
}

impl Responder {
    /// Create a responder reporting through `tracing` and falling back to
    /// [`HtmlFallback`].
    #[must_use]
    pub fn new(builder: EnvelopeBuilder) -> Self {
        Self {
            builder,
            reporter: Arc::new(TracingReporter),
            fallback: Arc::new(HtmlFallback),
        }
    }

    /// Replace the failure reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Replace the fallback renderer.
    #[must_use]
    pub fn with_fallback_renderer(mut self, fallback: impl FallbackRenderer + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    /// The envelope builder.
    #[must_use]
    pub const fn builder(&self) -> &EnvelopeBuilder {
        &self.builder
    }

    /// 200 response.
    #[must_use]
    pub fn ok(&self, message: &str, data: impl Into<ResponseData>) -> ApiReply {
        self.success(ResponseStatus::OK, message, data, HeaderMap::new())
    }

    /// 201 response.
    #[must_use]
    pub fn created(&self, message: &str, data: impl Into<ResponseData>) -> ApiReply {
        self.success(ResponseStatus::CREATED, message, data, HeaderMap::new())
    }

    /// 202 response.
    #[must_use]
    pub fn accepted(&self, message: &str, data: impl Into<ResponseData>) -> ApiReply {
        self.success(ResponseStatus::ACCEPTED, message, data, HeaderMap::new())
    }

    /// 204 response.
    #[must_use]
    pub fn no_content(&self) -> ApiReply {
        self.success(ResponseStatus::NO_CONTENT, "", ResponseData::Absent, HeaderMap::new())
    }

    /// Response with any status, message and payload.
    #[must_use]
    pub fn success(
        &self,
        status: ResponseStatus,
        message: &str,
        data: impl Into<ResponseData>,
        headers: HeaderMap,
    ) -> ApiReply {
        self.reply(
            ResponseDraft::new(status)
                .with_message(message)
                .with_data(data)
                .with_headers(headers),
        )
    }

    /// Response for a single resource.
    ///
    /// A resource without extra top-level fields is treated as plain data.
    /// Otherwise its full document (wrapped fields plus extras) is nested
    /// under the wrapper key.
    #[must_use]
    pub fn resource<R>(&self, resource: R, message: &str, status: ResponseStatus) -> ApiReply
    where
        R: JsonResource + 'static,
    {
        if resource.with().is_empty() && resource.additional().is_empty() {
            return self.success(status, message, ResponseData::resource(resource), HeaderMap::new());
        }

        let document = Value::Object(resource_document(&resource));
        ApiReply(self.builder.from_json_response(
            status,
            HeaderMap::new(),
            document,
            Some(message),
            true,
        ))
    }

    /// Response for a resource collection.
    ///
    /// With `wrap`, the collection document is nested under the wrapper key;
    /// otherwise its fields (items, `links`, `meta`) join the envelope.
    #[must_use]
    pub fn resource_collection(
        &self,
        collection: &ResourceCollection,
        message: &str,
        wrap: bool,
        status: ResponseStatus,
    ) -> ApiReply {
        ApiReply(self.builder.from_json_response(
            status,
            HeaderMap::new(),
            collection.document(),
            Some(message),
            wrap,
        ))
    }

    /// 4xx response with an optional error payload.
    #[must_use]
    pub fn client_error(
        &self,
        status: ResponseStatus,
        message: &str,
        error: Option<Map<String, Value>>,
        headers: HeaderMap,
    ) -> ApiReply {
        self.success(status, message, error, headers)
    }

    /// 400 response.
    #[must_use]
    pub fn bad_request(&self, message: &str, error: Option<Map<String, Value>>) -> ApiReply {
        self.client_error(ResponseStatus::BAD_REQUEST, message, error, HeaderMap::new())
    }

    /// 401 response.
    #[must_use]
    pub fn unauthenticated(&self, message: &str) -> ApiReply {
        self.client_error(ResponseStatus::UNAUTHORIZED, message, None, HeaderMap::new())
    }

    /// 403 response.
    #[must_use]
    pub fn forbidden(&self, message: &str, error: Option<Map<String, Value>>) -> ApiReply {
        self.client_error(ResponseStatus::FORBIDDEN, message, error, HeaderMap::new())
    }

    /// 404 response.
    #[must_use]
    pub fn not_found(&self, message: &str, error: Option<Map<String, Value>>) -> ApiReply {
        self.client_error(ResponseStatus::NOT_FOUND, message, error, HeaderMap::new())
    }

    /// Validation-failure response.
    #[must_use]
    pub fn validation_failed(
        &self,
        errors: &ValidationErrors,
        input: Option<&Map<String, Value>>,
        message: Option<&str>,
    ) -> ApiReply {
        ApiReply(self.builder.from_failed_validation(errors, input, message))
    }

    /// Server-error response; reports `fault` when given.
    ///
    /// A blank `message` is replaced by the fault's own text.
    #[must_use]
    pub fn server_error(
        &self,
        message: &str,
        status: ResponseStatus,
        fault: Option<&anyhow::Error>,
    ) -> ApiReply {
        if let Some(error) = fault {
            self.reporter.report(error);
        }

        let message = match fault {
            Some(error) if message.trim().is_empty() => error.to_string(),
            _ => message.to_string(),
        };
        self.reply(ResponseDraft::new(status).with_message(message))
    }

    /// Fail with a validation fault when `condition` holds.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::Validation`] built from `messages` when `condition`
    /// is true.
    pub fn fail_validation_when<I, K, V>(condition: bool, messages: I) -> Result<(), Fault>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if condition {
            return Err(Fault::validation(messages));
        }
        Ok(())
    }

    /// Render a fault without reporting it.
    #[must_use]
    pub fn render_fault(&self, fault: &Fault) -> Response {
        match classify(fault) {
            Classified::Response(carried) => {
                let (body, wrap) = match carried.body() {
                    CarriedBody::Json(body) => (body.clone(), false),
                    CarriedBody::Raw(content) => (json!({"content": content}), true),
                };
                ApiReply(self.builder.from_json_response(
                    carried.status(),
                    carried.headers().clone(),
                    body,
                    Some(CARRIED_RESPONSE_MESSAGE),
                    wrap,
                ))
                .into_response()
            }
            Classified::Validation(validation) => self.render_validation(validation),
            Classified::Http(http) => self.render_http(&http),
            Classified::Unclassified(error) => {
                if self.builder.config().render_html_on_exception {
                    return self.fallback.render(fault);
                }
                self.reply(
                    ResponseDraft::new(ResponseStatus::INTERNAL_SERVER_ERROR)
                        .with_message(SERVER_ERROR_MESSAGE)
                        .with_data(self.debug_payload(error)),
                )
                .into_response()
            }
        }
    }

    /// Render a fault, reporting it first when it is unclassified.
    #[must_use]
    pub fn handle_fault(&self, fault: &Fault) -> Response {
        if let Classified::Unclassified(error) = classify(fault) {
            self.reporter.report(error);
        }
        self.render_fault(fault)
    }

    fn render_validation(&self, validation: &ValidationFault) -> Response {
        self.validation_failed(validation.errors(), validation.input(), validation.message())
            .into_response()
    }

    fn render_http(&self, http: &HttpFault) -> Response {
        let message = if http.message().is_empty() {
            http.status().status_text()
        } else {
            http.message()
        };
        let data = http.error_data().cloned().map_or(ResponseData::Absent, ResponseData::from);

        self.reply(
            ResponseDraft::new(http.status())
                .with_message(message)
                .with_data(data)
                .with_headers(http.headers().clone()),
        )
        .into_response()
    }

    fn debug_payload(&self, error: &anyhow::Error) -> Value {
        if !self.builder.config().debug {
            return json!({ "message": SERVER_ERROR_MESSAGE });
        }

        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let backtrace = error.backtrace();
        let trace: Vec<String> =
            if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
                backtrace.to_string().lines().map(str::to_string).collect()
            } else {
                Vec::new()
            };

        json!({
            "message": error.to_string(),
            "exception": format!("{:?}", error.root_cause()),
            "causes": causes,
            "trace": trace,
        })
    }

    fn reply(&self, draft: ResponseDraft) -> ApiReply {
        ApiReply(self.builder.assemble(draft))
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        if let Self::Unclassified(error) = &self {
            tracing::debug!(error = %error, "Rendering unclassified fault without a configured responder");
        }
        let mut response = Responder::default().render_fault(&self);
        response.extensions_mut().insert(Arc::new(self));
        response
    }
}
