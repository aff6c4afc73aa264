//! Errors

use salvo::http::StatusError;
use tracing::error;

use rigforge_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Cart item already exists")
        }
        CartsServiceError::InvalidReference => StatusError::bad_request().brief("Unknown product"),
        CartsServiceError::MissingRequiredData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::InvalidData(reason) => StatusError::bad_request().brief(reason),
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
