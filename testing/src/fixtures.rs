//! Example catalog and configuration.
//!
//! Messages live under the `api` namespace, so the matching configuration
//! uses `api::success` and `api::errors` as translation domains.

use api_envelope_core::{EnvelopeBuilder, InMemoryCatalog, ResponseConfig};
use serde_json::json;
use std::sync::Arc;

/// Namespace of the example messages.
pub const NAMESPACE: &str = "api";

/// Catalog with the example `errors` and `success` groups.
///
/// | path | text |
/// |------|------|
/// | `errors.Example Error` | Please wait a few minutes and try again. |
/// | `errors.example_code` | An example error message |
/// | `errors.validation_failed` | Validation Failed. |
/// | `errors.error_code.error_code_name` | Example error message with :attribute |
/// | `success.example_code` | Example success message, :status |
/// | `success.Example response message` | An example response message |
#[must_use]
pub fn example_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_group(
            Some(NAMESPACE),
            "errors",
            json!({
                "Example Error": "Please wait a few minutes and try again.",
                "example_code": "An example error message",
                "validation_failed": "Validation Failed.",
                "error_code": {
                    "error_code_name": "Example error message with :attribute",
                },
            }),
        )
        .with_group(
            Some(NAMESPACE),
            "success",
            json!({
                "example_code": "Example success message, :status",
                "Example response message": "An example response message",
            }),
        )
}

/// Default configuration with translation domains under [`NAMESPACE`].
#[must_use]
pub fn example_config() -> ResponseConfig {
    ResponseConfig::default().with_translation_domains(
        format!("{NAMESPACE}::success"),
        format!("{NAMESPACE}::errors"),
    )
}

/// Builder over [`example_config`] and [`example_catalog`].
#[must_use]
pub fn example_builder() -> EnvelopeBuilder {
    example_builder_with(example_config())
}

/// Builder over `config` and [`example_catalog`].
#[must_use]
pub fn example_builder_with(config: ResponseConfig) -> EnvelopeBuilder {
    EnvelopeBuilder::new(Arc::new(config), Arc::new(example_catalog()))
}
