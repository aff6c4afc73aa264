//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{carts::errors::into_status_error, extensions::*, observability, state::State};

/// Clear Cart Handler
///
/// Removes every line of the signed-in user's cart. Clearing an empty cart succeeds.
#[endpoint(
    tags("cart"),
    summary = "Clear Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Cart cleared"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let result = state.app.carts.clear_cart(user.uuid).await;

    observability::record_cart_operation("clear", result.is_ok());

    result.map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
