//! Axum integration for API envelopes.
//!
//! Handlers return [`ApiReply`] on success and [`Fault`] on failure; both
//! render as the JSON envelope built by `api-envelope-core`.
//!
//! # Request Flow
//!
//! 1. **Handler** builds a reply through the [`Responder`] in router state,
//!    or bails out with a [`Fault`]
//! 2. **Fault rendering** classifies the fault ([`classify`]) and renders it
//!    with a default responder, tagging the response
//! 3. **[`envelope_layer`]** re-renders tagged responses with the configured
//!    responder and reports unclassified faults
//!
//! # Example
//!
//! ```
//! use api_envelope_core::{EnvelopeBuilder, InMemoryCatalog, ResponseConfig};
//! use api_envelope_web::{envelope_layer, handlers::fallback, ApiReply, Fault, Responder};
//! use axum::{extract::State, routing::get, Router};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! async fn show_user(State(responder): State<Responder>) -> Result<ApiReply, Fault> {
//!     Ok(responder.ok("user_found", json!({"id": 1, "name": "Jane"})))
//! }
//!
//! let catalog = InMemoryCatalog::new()
//!     .with_group(None, "success", json!({"user_found": "User found."}));
//! let config = ResponseConfig::from_toml_str("debug = false").unwrap();
//! let responder = Responder::new(EnvelopeBuilder::new(Arc::new(config), Arc::new(catalog)));
//!
//! let app: Router = Router::new()
//!     .route("/users/1", get(show_user))
//!     .fallback(fallback::not_found)
//!     .layer(envelope_layer(responder.clone()))
//!     .with_state(responder);
//! ```

pub mod classify;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod report;
pub mod responder;

// Re-export key types for convenience
pub use error::{CarriedBody, CarriedResponse, Fault, HttpFault, ValidationFault};
pub use middleware::{EnvelopeLayer, envelope_layer};
pub use report::{FailureReporter, FallbackRenderer, HtmlFallback, TracingReporter};
pub use responder::{ApiReply, Responder};

/// Result type alias for handlers.
pub type WebResult<T> = Result<T, Fault>;
