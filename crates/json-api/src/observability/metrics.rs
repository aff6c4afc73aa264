//! Prometheus metrics: HTTP traffic plus storefront counters for auth and cart writes.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const DURATION_BUCKETS: [f64; 12] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    auth_attempts_total: IntCounterVec,
    cart_operations_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

fn metrics() -> Option<&'static Metrics> {
    METRICS
        .get_or_init(|| {
            build_metrics()
                .inspect_err(|source| error!("failed to build metrics registry: {source}"))
                .ok()
        })
        .as_ref()
}

fn register<C: Collector + Clone + 'static>(
    registry: &Registry,
    collector: C,
) -> Result<C, prometheus::Error> {
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

fn build_metrics() -> Result<Metrics, prometheus::Error> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "rigforge_json_http_requests_total",
                "HTTP requests by method, route, status class and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        )?,
    )?;

    let request_duration_seconds = register(
        &registry,
        HistogramVec::new(
            HistogramOpts::new(
                "rigforge_json_http_request_duration_seconds",
                "HTTP request duration in seconds by method and route.",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route"],
        )?,
    )?;

    let requests_in_flight = register(
        &registry,
        IntGauge::new(
            "rigforge_json_http_requests_in_flight",
            "HTTP requests currently being served.",
        )?,
    )?;

    let auth_attempts_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "rigforge_json_auth_attempts_total",
                "Sign-in and registration attempts by kind and outcome.",
            ),
            &["kind", "outcome"],
        )?,
    )?;

    let cart_operations_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new(
                "rigforge_json_cart_operations_total",
                "Server cart writes by operation and outcome.",
            ),
            &["operation", "outcome"],
        )?,
    )?;

    Ok(Metrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        auth_attempts_total,
        cart_operations_total,
    })
}

/// Keeps the in-flight gauge raised for as long as it lives.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard(Option<&'static Metrics>);

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let metrics = metrics();

        if let Some(metrics) = metrics {
            metrics.requests_in_flight.inc();
        }

        Self(metrics)
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(metrics) = self.0 {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a `login` or `register` attempt.
pub(crate) fn record_auth_attempt(kind: &'static str, succeeded: bool) {
    if let Some(metrics) = metrics() {
        metrics
            .auth_attempts_total
            .with_label_values(&[kind, outcome(succeeded)])
            .inc();
    }
}

/// Count a server cart write such as `add` or `sync`.
pub(crate) fn record_cart_operation(operation: &'static str, succeeded: bool) {
    if let Some(metrics) = metrics() {
        metrics
            .cart_operations_total
            .with_label_values(&[operation, outcome(succeeded)])
            .inc();
    }
}

const fn outcome(succeeded: bool) -> &'static str {
    if succeeded { "ok" } else { "error" }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
