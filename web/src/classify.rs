//! Fault classification.
//!
//! Classification runs in two passes. Normalization first rewrites the
//! not-found and auth categories into plain HTTP faults:
//!
//! | fault | status | message |
//! |-------|--------|---------|
//! | `NotFound`, `ModelNotFound` | 404 | `"Resource not found."` when blank or a "no query results" message |
//! | `Unauthenticated` | 401 | kept |
//! | `Unauthorized` | 403 | kept |
//!
//! The result is then sorted into one of the response shapes, checked in
//! order: carried response, validation failure, HTTP fault, unclassified.

use crate::error::{CarriedResponse, Fault, HttpFault, ValidationFault};
use api_envelope_core::ResponseStatus;
use std::borrow::Cow;

/// Message for not-found faults without a usable message.
pub const RESOURCE_NOT_FOUND: &str = "Resource not found.";

const NO_QUERY_RESULTS: &str = "No query results for model";

/// A fault sorted into the shape that decides how it is rendered.
#[derive(Debug)]
pub enum Classified<'a> {
    /// Re-shape the carried response.
    Response(&'a CarriedResponse),
    /// Build a validation-failure envelope.
    Validation(&'a ValidationFault),
    /// Build an envelope from the fault's status, message and headers.
    Http(Cow<'a, HttpFault>),
    /// Report and render a server error.
    Unclassified(&'a anyhow::Error),
}

/// Normalize and classify a fault.
///
/// # Examples
///
/// ```
/// use api_envelope_web::classify::{classify, Classified};
/// use api_envelope_web::Fault;
///
/// let fault = Fault::not_found("");
/// let Classified::Http(http) = classify(&fault) else { unreachable!() };
/// assert_eq!(http.status().code(), 404);
/// assert_eq!(http.message(), "Resource not found.");
/// ```
#[must_use]
pub fn classify(fault: &Fault) -> Classified<'_> {
    match fault {
        Fault::NotFound(message) => Classified::Http(Cow::Owned(not_found(message))),
        Fault::ModelNotFound { .. } => Classified::Http(Cow::Owned(not_found(&fault.to_string()))),
        Fault::Unauthenticated(message) => Classified::Http(Cow::Owned(
            HttpFault::new(ResponseStatus::UNAUTHORIZED).with_message(message.clone()),
        )),
        Fault::Unauthorized(message) => Classified::Http(Cow::Owned(
            HttpFault::new(ResponseStatus::FORBIDDEN).with_message(message.clone()),
        )),
        Fault::Response(response) => Classified::Response(response),
        Fault::Validation(validation) => Classified::Validation(validation),
        Fault::Http(http) => Classified::Http(Cow::Borrowed(http)),
        Fault::Unclassified(error) => Classified::Unclassified(error),
    }
}

fn not_found(message: &str) -> HttpFault {
    let message = if message.trim().is_empty() || message.contains(NO_QUERY_RESULTS) {
        RESOURCE_NOT_FOUND
    } else {
        message
    };
    HttpFault::new(ResponseStatus::NOT_FOUND).with_message(message)
}
