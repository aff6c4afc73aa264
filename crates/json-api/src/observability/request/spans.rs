//! Route templates for span names and metric labels.

use uuid::Uuid;

/// Collapse UUID segments so `/cart/<uuid>` and `/components/<uuid>` each form one route.
pub(super) fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{uuid}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
