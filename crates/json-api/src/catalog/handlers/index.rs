//! Product Index Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use rigforge_app::domain::catalog::models::ProductFilter;

use crate::{
    catalog::{errors::into_status_error, models::ProductResponse},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    /// The matching products, oldest first
    pub products: Vec<ProductResponse>,
}

/// Product Index Handler
///
/// Lists products. Supports `type`, `brand`, `minPrice`, `maxPrice` and `search` query
/// parameters; price bounds apply to the discounted price when there is one.
#[endpoint(tags("catalog"), summary = "List Products")]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let category = depot.category_or_500()?;
    let filter = product_filter(req)?;

    let products = state
        .app
        .catalog
        .list_products(category, filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ProductsResponse {
        products: products.into_iter().map(Into::into).collect(),
    }))
}

fn product_filter(req: &Request) -> Result<ProductFilter, StatusError> {
    Ok(ProductFilter {
        kind: text_param(req, "type"),
        brand: text_param(req, "brand"),
        min_price: price_param(req, "minPrice")?,
        max_price: price_param(req, "maxPrice")?,
        search: text_param(req, "search"),
    })
}

fn text_param(req: &Request, key: &str) -> Option<String> {
    req.query::<String>(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn price_param(req: &Request, key: &str) -> Result<Option<Decimal>, StatusError> {
    text_param(req, key)
        .map(|value| value.parse::<Decimal>())
        .transpose()
        .or_400("price filters must be decimal numbers")
}
