//! # API Envelope Core
//!
//! Builds the uniform JSON envelope returned by an HTTP API.
//!
//! Every response, successful or not, has the same outer shape:
//!
//! ```json
//! {
//!   "success": false,
//!   "message": "Example error message with yes",
//!   "error_code": "error_code_name",
//!   "error": { "detail": "..." }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **Message identifier**: `namespace::name:key=value|key=value`, a lookup
//!   name with inline attributes ([`message`])
//! - **Translator**: resolves identifiers through a [`MessageCatalog`], falling
//!   back to the literal text on a miss ([`translation`])
//! - **Response data**: the closed set of payload shapes and their
//!   normalization ([`data`], [`resource`])
//! - **Validation aggregation**: one error per top-level field ([`validation`])
//! - **Envelope builder**: status + message + data → [`ApiResponse`]
//!   ([`builder`])
//!
//! Everything here is synchronous and free of per-request shared state; the
//! configuration and catalog are read-only once built.
//!
//! ## Example
//!
//! ```
//! use api_envelope_core::{EnvelopeBuilder, InMemoryCatalog, ResponseConfig, ResponseData};
//! use http::HeaderMap;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let catalog = InMemoryCatalog::new().with_group(
//!     None,
//!     "errors",
//!     json!({"error_code": {"error_code_name": "Example error message with :attribute"}}),
//! );
//! let builder = EnvelopeBuilder::new(Arc::new(ResponseConfig::default()), Arc::new(catalog));
//!
//! let response = builder
//!     .build(
//!         400,
//!         Some("error_code.error_code_name:attribute=yes"),
//!         ResponseData::Absent,
//!         HeaderMap::new(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(response.body().message(), Some("Example error message with yes"));
//! assert_eq!(response.body().error_code(), Some("error_code_name"));
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod data;
pub mod envelope;
pub mod error;
pub mod message;
pub mod resource;
pub mod status;
pub mod translation;
pub mod validation;

pub use builder::{EnvelopeBuilder, ResponseDraft};
pub use catalog::InMemoryCatalog;
pub use config::ResponseConfig;
pub use data::{JsonResource, Normalized, ResponseData};
pub use envelope::{ApiResponse, Envelope};
pub use error::{EnvelopeError, Result};
pub use message::{Attributes, MessageIdentifier};
pub use resource::{Pagination, ResourceCollection};
pub use status::{ResponseStatus, WrapperTable};
pub use translation::{EchoCatalog, MessageCatalog, Translator};
pub use validation::{ValidationErrorFormatter, ValidationErrors};
