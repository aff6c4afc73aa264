//! Parent trace context from `traceparent` headers.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::{HeaderMap, HeaderName};

pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| extract_with(propagator, headers))
}

/// Extract onto an empty context so a request without trace headers never inherits the
/// span chain active in this process.
fn extract_with(propagator: &dyn TextMapPropagator, headers: &HeaderMap) -> Option<Context> {
    let context = propagator.extract_with_context(&Context::new(), &Headers(headers));

    context
        .span()
        .span_context()
        .is_valid()
        .then_some(context)
}

struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.to_str().ok()
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}
