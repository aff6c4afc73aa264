//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::{errors::into_status_error, models::CartItemResponse},
    extensions::*,
    observability,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartItemRequest {
    pub component_id: Uuid,

    /// Units to add; defaults to one
    #[serde(default = "one")]
    pub quantity: i64,
}

const fn one() -> i64 {
    1
}

/// Add Cart Item Handler
///
/// Adds units of a product, growing the existing line when there is one.
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Cart item stored"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.add",
    skip_all,
    fields(user_uuid = tracing::field::Empty, product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user.uuid));
    span.record("product_uuid", tracing::field::display(request.component_id));

    let result = state
        .app
        .carts
        .add_item(user.uuid, request.component_id.into(), request.quantity)
        .await;

    observability::record_cart_operation("add", result.is_ok());

    let item = result.map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/cart/{}", item.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(item.into()))
}
