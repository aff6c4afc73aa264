//! `x-request-id` handling.

use salvo::{http::header::HeaderValue, prelude::Response};
use uuid::Uuid;

pub(super) const HEADER: &str = "x-request-id";

const MAX_LEN: usize = 128;

/// Keep a caller supplied id when it is short, visible ASCII; otherwise mint a v7 UUID.
pub(super) fn resolve(incoming: Option<String>) -> String {
    incoming
        .map(|value| value.trim().to_owned())
        .filter(|value| is_acceptable(value))
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}

fn is_acceptable(value: &str) -> bool {
    !value.is_empty() && value.len() <= MAX_LEN && value.bytes().all(|b| b.is_ascii_graphic())
}

pub(super) fn echo(res: &mut Response, request_id: &str) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        res.headers_mut().insert(HEADER, value);
    }
}
