//! # API Envelope Testing
//!
//! Testing utilities for code built on the API envelope crates.
//!
//! This crate provides:
//! - A recording failure reporter
//! - An example message catalog and matching configuration
//! - Tracing setup for tests
//! - Response body helpers
//!
//! ## Example
//!
//! ```
//! use api_envelope_core::ResponseData;
//! use api_envelope_testing::fixtures;
//! use axum::http::HeaderMap;
//!
//! let builder = fixtures::example_builder();
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
//! ```

pub mod fixtures;

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;
use thiserror::Error;

/// Mock implementations of the reporting hooks.
pub mod mocks {
    use std::sync::{Arc, Mutex, PoisonError};

    /// Failure reporter that records every reported error.
    ///
    /// Clones share the same record.
    ///
    /// # Example
    ///
    /// ```
    /// use api_envelope_testing::mocks::RecordingReporter;
    ///
    /// let recorder = RecordingReporter::new();
    /// let sink = recorder.sink();
    /// sink(&anyhow::anyhow!("disk full"));
    ///
    /// assert_eq!(recorder.reports(), ["disk full"]);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct RecordingReporter {
        reports: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingReporter {
        /// Create an empty recorder.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A reporting function feeding this recorder.
        ///
        /// Pass it to `Responder::with_reporter`.
        #[must_use]
        pub fn sink(&self) -> impl Fn(&anyhow::Error) + Send + Sync + 'static {
            let reports = Arc::clone(&self.reports);
            move |error: &anyhow::Error| {
                reports
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(error.to_string());
            }
        }

        /// Messages of every recorded error, in order.
        #[must_use]
        pub fn reports(&self) -> Vec<String> {
            self.reports
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Number of recorded errors.
        #[must_use]
        pub fn count(&self) -> usize {
            self.reports
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Forget everything recorded so far.
        pub fn clear(&self) {
            self.reports
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }
}

/// Install a test-friendly `tracing` subscriber.
///
/// Honors `RUST_LOG` and defaults to `debug`. Safe to call from every test;
/// only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Failure reading a response body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body stream failed.
    #[error("Failed to read response body: {0}")]
    Read(#[from] axum::Error),

    /// The body is not valid JSON.
    #[error("Response body is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a response body as text.
///
/// # Errors
///
/// Returns [`BodyError::Read`] if the body stream fails.
pub async fn body_text(response: Response) -> Result<String, BodyError> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a response body as JSON.
///
/// # Errors
///
/// Returns [`BodyError::Read`] if the body stream fails and
/// [`BodyError::Json`] if it is not JSON.
pub async fn body_json(response: Response) -> Result<Value, BodyError> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
