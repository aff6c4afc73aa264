//! Get Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    catalog::{errors::into_status_error, models::ProductResponse},
    extensions::*,
    state::State,
};

/// Get Product Handler
///
/// Returns a product of the routed category.
#[endpoint(tags("catalog"), summary = "Get Product")]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let category = depot.category_or_500()?;

    let product = state
        .app
        .catalog
        .get_product(category, uuid.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}
