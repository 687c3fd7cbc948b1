//! Per-request tracing.
//!
//! Spans and completion events record the path only. On this relay the
//! query string carries authorization codes and access tokens.

use std::time::Duration;

use axum::http::{Request, Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{
    DefaultOnBodyChunk, DefaultOnEos, DefaultOnRequest, MakeSpan, OnResponse, TraceLayer,
};
use tracing::Span;

/// The relay's `TraceLayer`.
///
/// Completion is logged by [`LogCompletion`] at a level chosen from the
/// status, so the default failure hook is turned off.
pub type RelayTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    PathSpan,
    DefaultOnRequest,
    LogCompletion,
    DefaultOnBodyChunk,
    DefaultOnEos,
    (),
>;

/// Build the trace layer. `log_completions` toggles the per-request
/// completion event; spans are always created.
pub fn trace_layer(log_completions: bool) -> RelayTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(PathSpan)
        .on_response(LogCompletion {
            enabled: log_completions,
        })
        .on_failure(())
}

/// Opens an `http_request` span with the method and path.
#[derive(Debug, Clone, Copy)]
pub struct PathSpan;

impl<B> MakeSpan<B> for PathSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
        )
    }
}

/// Logs status and latency once the response is ready: error for 5xx,
/// warn for 4xx, info otherwise.
#[derive(Debug, Clone, Copy)]
pub struct LogCompletion {
    enabled: bool,
}

impl<B> OnResponse<B> for LogCompletion {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        if !self.enabled {
            return;
        }

        let status = response.status();
        let latency_ms = latency.as_millis();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                latency_ms = %latency_ms,
                "Request completed with server error"
            );
        } else if status.is_client_error() {
            tracing::warn!(
                status = status.as_u16(),
                latency_ms = %latency_ms,
                "Request completed with client error"
            );
        } else {
            tracing::info!(
                status = status.as_u16(),
                latency_ms = %latency_ms,
                "Request completed"
            );
        }
    }
}
