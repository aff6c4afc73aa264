//! Per-request span, request id, access log and HTTP metrics.

mod parent_context;
mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use rigforge_app::auth::AuthenticatedUser;

use super::{metrics, settings};

/// Probe endpoints that would drown the access log.
const UNLOGGED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNLOGGED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let _in_flight = metrics::InFlightRequestGuard::track();

    let request_id = request_ids::resolve(req.header::<String>(request_ids::HEADER));

    request_ids::echo(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let route = spans::route_template(&path);

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %format!("{method} {route}"),
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %req.remote_addr(),
        user_uuid = tracing::field::Empty,
        role = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(parent) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let elapsed = started.elapsed();
    let status = res.status_code.unwrap_or(StatusCode::OK);
    let duration_ms = elapsed.as_millis();

    metrics::observe_request(&method, &route, status.as_u16(), elapsed.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    span.in_scope(|| {
        if status.is_server_error() {
            error!(status = status.as_u16(), duration_ms, "request.completed");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), duration_ms, "request.completed");
        } else {
            info!(status = status.as_u16(), duration_ms, "request.completed");
        }

        let threshold_ms = u128::from(settings::slow_request_threshold_ms());

        if duration_ms > threshold_ms {
            warn!(duration_ms, threshold_ms, "slow request");
        }
    });
}

/// Attach the authenticated user to the current request span.
pub(crate) fn record_user(user: &AuthenticatedUser) {
    let span = Span::current();

    span.record("user_uuid", tracing::field::display(user.uuid));
    span.record("role", tracing::field::display(&user.role));
}
