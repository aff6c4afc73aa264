//! Stock Levels Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigforge_app::domain::catalog::models::StockLevel;

use crate::{catalog::errors::into_status_error, extensions::*, state::State};

/// Upper bound on products per lookup.
const MAX_STOCK_LOOKUP: usize = 200;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockRequest {
    pub uuids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockEntry {
    pub uuid: Uuid,
    pub stock: u32,
}

impl From<StockLevel> for StockEntry {
    fn from(level: StockLevel) -> Self {
        Self {
            uuid: level.uuid.into(),
            stock: level.stock,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StockResponse {
    /// Current stock of each known product; unknown ids are left out
    pub stock: Vec<StockEntry>,
}

/// Stock Levels Handler
///
/// Current stock of the requested products, used to clamp cart quantities for display.
#[endpoint(tags("catalog"), summary = "Stock Levels")]
pub(crate) async fn handler(
    json: JsonBody<StockRequest>,
    depot: &mut Depot,
) -> Result<Json<StockResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let uuids = json.into_inner().uuids;

    if uuids.len() > MAX_STOCK_LOOKUP {
        return Err(StatusError::bad_request().brief("too many products in one lookup"));
    }

    if uuids.is_empty() {
        return Ok(Json(StockResponse { stock: Vec::new() }));
    }

    let levels = state
        .app
        .catalog
        .stock_levels(uuids.into_iter().map(Into::into).collect())
        .await
        .map_err(into_status_error)?;

    Ok(Json(StockResponse {
        stock: levels.into_iter().map(Into::into).collect(),
    }))
}
