//! Catalog Errors

use salvo::http::StatusError;
use tracing::error;

use rigforge_app::domain::catalog::CatalogServiceError;

pub(crate) fn into_status_error(error: CatalogServiceError) -> StatusError {
    match error {
        CatalogServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product already exists")
        }
        CatalogServiceError::InvalidReference | CatalogServiceError::MissingRequiredData => {
            StatusError::bad_request().brief("Invalid product payload")
        }
        CatalogServiceError::InvalidData(reason) => StatusError::bad_request().brief(reason),
        CatalogServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        CatalogServiceError::Sql(source) => {
            error!("catalog storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
