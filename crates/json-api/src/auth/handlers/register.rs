//! Register Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use rigforge_app::auth::NewUser;

use crate::{
    auth::{TokenResponse, into_status_error},
    extensions::*,
    observability,
    state::State,
};

/// Register Request
#[derive(Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        NewUser {
            name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}

/// Register Handler
///
/// Creates a customer account and signs it in.
#[endpoint(
    tags("auth"),
    summary = "Register",
    responses(
        (status_code = StatusCode::CREATED, description = "Account created"),
        (status_code = StatusCode::CONFLICT, description = "Email is already registered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "auth.register", skip(json, depot, res), err)]
pub(crate) async fn handler(
    json: JsonBody<RegisterRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<TokenResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let result = state.app.auth.register(json.into_inner().into()).await;

    observability::record_auth_attempt("register", result.is_ok());

    let issued = result.map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(issued.into()))
}
