//! Sync Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigforge_app::domain::carts::models::SyncItem;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    observability,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SyncItemRequest {
    pub component_id: Uuid,
    pub quantity: i64,
}

impl From<SyncItemRequest> for SyncItem {
    fn from(request: SyncItemRequest) -> Self {
        SyncItem {
            product_uuid: request.component_id.into(),
            quantity: request.quantity,
        }
    }
}

/// Sync Cart Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SyncCartRequest {
    pub items: Vec<SyncItemRequest>,
}

/// Sync Cart Handler
///
/// Replaces the server cart with the client's lines in one transaction.
#[endpoint(
    tags("cart"),
    summary = "Sync Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart replaced"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.sync",
    skip_all,
    fields(user_uuid = tracing::field::Empty, lines = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<SyncCartRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;
    let items = json.into_inner().items;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user.uuid));
    span.record("lines", items.len());

    let result = state
        .app
        .carts
        .sync_cart(user.uuid, items.into_iter().map(Into::into).collect())
        .await;

    observability::record_cart_operation("sync", result.is_ok());

    let cart = result.map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use rigforge_app::domain::{
        carts::{
            CartsServiceError, MockCartsService,
            models::{Cart, CartItemUuid},
        },
        catalog::models::ProductUuid,
    };

    use crate::{
        carts::models::tests::make_item,
        test_helpers::{TEST_USER_UUID, carts_service},
    };

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/sync").post(handler))
    }

    #[tokio::test]
    async fn test_sync_forwards_lines_in_order() -> TestResult {
        let gpu = ProductUuid::new();
        let cpu = ProductUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_sync_cart()
            .once()
            .withf(move |user, items| {
                *user == TEST_USER_UUID
                    && *items
                        == vec![
                            SyncItem {
                                product_uuid: gpu,
                                quantity: 2,
                            },
                            SyncItem {
                                product_uuid: cpu,
                                quantity: 1,
                            },
                        ]
            })
            .return_once(move |_, _| {
                Ok(Cart::from_items(vec![
                    make_item(CartItemUuid::new(), gpu, 2),
                    make_item(CartItemUuid::new(), cpu, 1),
                ]))
            });

        let response: CartResponse = TestClient::post("http://example.com/cart/sync")
            .json(&json!({
                "items": [
                    { "componentId": gpu.into_uuid(), "quantity": 2 },
                    { "componentId": cpu.into_uuid(), "quantity": 1 }
                ]
            }))
            .send(&make_service(carts))
            .await
            .take_json()
            .await?;

        assert_eq!(response.items.len(), 2);
        assert_eq!(response.item_count, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_sync_unknown_product_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_sync_cart()
            .once()
            .return_once(|_, _| Err(CartsServiceError::InvalidReference));

        let res = TestClient::post("http://example.com/cart/sync")
            .json(&json!({ "items": [{ "componentId": Uuid::now_v7(), "quantity": 1 }] }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
