//! Auth Errors

use salvo::http::StatusError;
use tracing::error;

use rigforge_app::auth::{AuthServiceError, TokenError};

pub(crate) fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        AuthServiceError::AlreadyExists => {
            StatusError::conflict().brief("Email is already registered")
        }
        AuthServiceError::InvalidCredentials => {
            StatusError::unauthorized().brief("Invalid email or password")
        }
        AuthServiceError::InvalidData(reason) => StatusError::bad_request().brief(reason),
        AuthServiceError::NotFound => StatusError::not_found().brief("User not found"),
        AuthServiceError::Token(TokenError::Expired | TokenError::Invalid) => {
            StatusError::unauthorized().brief("Invalid or expired token")
        }
        AuthServiceError::Token(source) => {
            error!("failed to process token: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Sql(source) => {
            error!("identity storage error: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::PasswordHash(source) => {
            error!("failed to process password: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Task(source) => {
            error!("password task failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
