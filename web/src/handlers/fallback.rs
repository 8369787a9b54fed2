//! Router fallback answering unknown routes with a 404 envelope.

use crate::error::Fault;

/// Fallback handler for unmatched routes.
///
/// Responds with the `404` "Resource not found." envelope. Under
/// [`crate::envelope_layer`] the message goes through the configured
/// responder like any other fault.
///
/// ```text
/// GET /does-not-exist
///
/// 404 {"success": false, "message": "Resource not found."}
/// ```
#[allow(clippy::unused_async)]
pub async fn not_found() -> Fault {
    Fault::not_found("")
}
