use axum::{
    body::Body,
    http::{Request, Response},
};
use std::time::Duration;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::{field::Empty, subscriber::set_global_default, Span, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `RUST_LOG` takes precedence over `default_env_filter`.
pub fn get_subscriber<Sink>(
    name: &str,
    default_env_filter: &str,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_env_filter));

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name.to_string(), sink))
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}

#[derive(Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _: &Request<B>) -> Option<RequestId> {
        Uuid::new_v4()
            .hyphenated()
            .to_string()
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

/// Reads the id assigned by `SetRequestIdLayer`, so it must run inside it.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok());

    tracing::info_span!(
        "Request",
        request_id,
        method = %request.method(),
        path = request.uri().path(),
        status = Empty,
        latency_ms = Empty,
    )
}

pub fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16())
        .record("latency_ms", latency.as_millis() as u64);
    tracing::info!("Finished processing request");
}
