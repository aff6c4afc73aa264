//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the signed-in user's cart priced at current catalog prices.
#[endpoint(tags("cart"), summary = "Get Cart", security(("bearer_auth" = [])))]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(user.uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
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
        carts_service(carts, Router::with_path("cart").get(handler))
    }

    #[tokio::test]
    async fn test_get_cart_returns_items_and_total() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|_| {
                Ok(Cart::from_items(vec![make_item(
                    CartItemUuid::new(),
                    ProductUuid::new(),
                    2,
                )]))
            });

        let response: CartResponse = TestClient::get("http://example.com/cart")
            .send(&make_service(carts))
            .await
            .take_json()
            .await?;

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.total, dec!(1098));
        assert_eq!(response.item_count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_cart_storage_error_returns_500() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
