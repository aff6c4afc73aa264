//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use crate::{
    catalog::{
        errors::into_status_error,
        models::{ProductRequest, ProductResponse},
    },
    extensions::*,
    state::State,
};

/// Product Update Handler
///
/// Replaces every editable field of the product.
#[endpoint(
    tags("catalog"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "catalog.update",
    skip(uuid, json, depot),
    fields(
        category = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        price = tracing::field::Empty,
        stock = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    json: JsonBody<ProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let category = depot.category_or_500()?;
    let request = json.into_inner();
    let product = uuid.into_inner();

    let span = tracing::Span::current();

    span.record("category", tracing::field::display(category));
    span.record("product_uuid", tracing::field::display(product));
    span.record("price", tracing::field::display(request.price));
    span.record("stock", request.stock);

    let updated = state
        .app
        .catalog
        .update_product(category, product.into(), request.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, stock = updated.stock, "updated product");

    Ok(Json(updated.into()))
}
