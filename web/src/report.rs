//! Failure reporting and fallback rendering.

use crate::error::Fault;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Sink for unclassified faults.
///
/// Called once per reported fault; must not fail or block for long.
pub trait FailureReporter: Send + Sync {
    /// Record `error`.
    fn report(&self, error: &anyhow::Error);
}

impl<F> FailureReporter for F
where
    F: Fn(&anyhow::Error) + Send + Sync,
{
    fn report(&self, error: &anyhow::Error) {
        self(error);
    }
}

/// Reports faults as `tracing` error events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report(&self, error: &anyhow::Error) {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        tracing::error!(error = %error, causes = ?causes, "Unhandled fault");
    }
}

/// Alternate renderer for unclassified faults.
///
/// Used instead of a JSON envelope when `render_html_on_exception` is set.
pub trait FallbackRenderer: Send + Sync {
    /// Render `fault`.
    fn render(&self, fault: &Fault) -> Response;
}

/// Minimal HTML error page.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlFallback;

const ERROR_PAGE: &str = "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head><meta charset=\"utf-8\"><title>Server Error</title></head>\n\
<body><h1>500</h1><p>Server Error</p></body>\n\
</html>\n";

impl FallbackRenderer for HtmlFallback {
    fn render(&self, _fault: &Fault) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Html(ERROR_PAGE)).into_response()
    }
}
