//! Healthcheck

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, state::State};

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the database answers, `unavailable` otherwise
    pub status: String,
}

/// Healthcheck handler
///
/// Reports whether the server can reach its database. Load balancers should take
/// a 503 as "stop routing here".
#[endpoint(
    tags("health"),
    summary = "Readiness check",
    responses(
        (status_code = StatusCode::OK, description = "Ready"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Database unreachable"),
    ),
)]
pub(crate) async fn handler(
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<HealthResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = if state.app.readiness.ready().await {
        "ok"
    } else {
        res.status_code(StatusCode::SERVICE_UNAVAILABLE);
        "unavailable"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
    }))
}
