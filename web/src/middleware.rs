//! Tower layer that renders faults with the application's responder.
//!
//! A handler returning `Err(Fault)` has no access to router state, so
//! [`Fault`]'s `IntoResponse` renders with a default responder and tags the
//! response with the fault. This layer finds tagged responses and renders
//! the fault again with the configured [`Responder`], reporting it when it
//! is unclassified.
//!
//! # Example
//!
//! ```
//! use api_envelope_web::{envelope_layer, handlers::fallback, Responder};
//! use axum::{routing::get, Router};
//!
//! let responder = Responder::default();
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "ok" }))
//!     .fallback(fallback::not_found)
//!     .layer(envelope_layer(responder));
//! ```

use crate::error::Fault;
use crate::responder::Responder;
use axum::{extract::Request, response::Response};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;

/// Create a layer that renders faults with `responder`.
#[must_use]
pub fn envelope_layer(responder: Responder) -> EnvelopeLayer {
    EnvelopeLayer {
        responder: Arc::new(responder),
    }
}

/// Layer re-rendering tagged fault responses.
#[derive(Clone, Debug)]
pub struct EnvelopeLayer {
    responder: Arc<Responder>,
}

impl<S> Layer<S> for EnvelopeLayer {
    type Service = EnvelopeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        EnvelopeMiddleware {
            inner,
            responder: Arc::clone(&self.responder),
        }
    }
}

/// Middleware service for [`EnvelopeLayer`].
#[derive(Clone, Debug)]
pub struct EnvelopeMiddleware<S> {
    inner: S,
    responder: Arc<Responder>,
}

impl<S> Service<Request> for EnvelopeMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let span = tracing::debug_span!(
            "api_envelope",
            method = %req.method(),
            uri = %req.uri(),
        );
        let responder = Arc::clone(&self.responder);
        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let response = fut.await?;

                let Some(fault) = response.extensions().get::<Arc<Fault>>().cloned() else {
                    return Ok(response);
                };

                tracing::debug!(status = %response.status(), "Re-rendering fault response");
                let mut rendered = responder.handle_fault(&fault);
                rendered.extensions_mut().insert(fault);
                Ok(rendered)
            }
            .instrument(span),
        )
    }
}
