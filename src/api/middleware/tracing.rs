//! Request logging for every route.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

/// Span and event levels used by [`layer`].
const REQUEST_LEVEL: Level = Level::INFO;

/// Wraps each request in an `INFO` span (method, URI, HTTP version) and logs
/// its start, its status with latency in milliseconds, and 5xx failures at
/// `ERROR`.
///
/// ```text
/// INFO request{method=GET uri=/abc version=HTTP/1.1}: started processing request
/// INFO request{method=GET uri=/abc version=HTTP/1.1}: finished processing request latency=3 ms status=302
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(REQUEST_LEVEL))
        .on_request(DefaultOnRequest::new().level(REQUEST_LEVEL))
        .on_response(
            DefaultOnResponse::new()
                .level(REQUEST_LEVEL)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::ERROR)
                .latency_unit(LatencyUnit::Millis),
        )
}
