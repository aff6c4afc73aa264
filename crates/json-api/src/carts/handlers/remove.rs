//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{carts::errors::into_status_error, extensions::*, observability, state::State};

/// Remove Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Remove Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Cart item removed"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart item not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    item: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let result = state
        .app
        .carts
        .remove_item(user.uuid, item.into_inner().into())
        .await;

    observability::record_cart_operation("remove", result.is_ok());

    result.map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use rigforge_app::domain::carts::{
        CartsServiceError, MockCartsService, models::CartItemUuid,
    };

    use crate::test_helpers::{TEST_USER_UUID, carts_service};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/{item}").delete(handler))
    }

    #[tokio::test]
    async fn test_remove_item_returns_204() -> TestResult {
        let item = CartItemUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_remove_item()
            .once()
            .withf(move |user, i| *user == TEST_USER_UUID && *i == item)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/cart/{item}"))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_missing_item_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_remove_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/cart/{}", CartItemUuid::new()))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
