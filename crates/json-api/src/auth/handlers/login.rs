//! Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{TokenResponse, into_status_error},
    extensions::*,
    observability,
    state::State,
};

/// Login Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login Handler
///
/// Exchanges credentials for a bearer token.
#[endpoint(
    tags("auth"),
    summary = "Login",
    responses(
        (status_code = StatusCode::OK, description = "Signed in"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid email or password"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<TokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let result = state
        .app
        .auth
        .login(&request.email, &request.password)
        .await;

    observability::record_auth_attempt("login", result.is_ok());

    let issued = result.map_err(into_status_error)?;

    Ok(Json(issued.into()))
}
