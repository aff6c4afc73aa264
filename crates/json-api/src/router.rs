//! App Router

use salvo::Router;

use crate::{auth, carts, catalog};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(auth_router())
        .push(catalog_router("components").hoop(catalog::components))
        .push(catalog_router("computers").hoop(catalog::computers))
        .push(Router::with_path("products/stock").post(catalog::stock::handler))
        .push(cart_router())
}

fn auth_router() -> Router {
    Router::with_path("auth")
        .push(Router::with_path("register").post(auth::register::handler))
        .push(Router::with_path("login").post(auth::login::handler))
        .push(
            Router::with_path("me")
                .hoop(auth::middleware::handler)
                .get(auth::me::handler),
        )
}

fn catalog_router(path: &str) -> Router {
    Router::with_path(path)
        .get(catalog::index::handler)
        .push(Router::with_path("{uuid}").get(catalog::get::handler))
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .hoop(auth::middleware::require_admin)
                .post(catalog::create::handler)
                .push(
                    Router::with_path("{uuid}")
                        .put(catalog::update::handler)
                        .delete(catalog::delete::handler),
                ),
        )
}

fn cart_router() -> Router {
    Router::with_path("cart")
        .hoop(auth::middleware::handler)
        .get(carts::get::handler)
        .post(carts::add::handler)
        .delete(carts::clear::handler)
        .push(Router::with_path("sync").post(carts::sync::handler))
        .push(
            Router::with_path("{item}")
                .put(carts::update::handler)
                .delete(carts::remove::handler),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{http::header::AUTHORIZATION, prelude::*, test::TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use rigforge_app::{
        auth::{AuthServiceError, AuthenticatedUser, MockAuthService, Role, TokenError},
        domain::catalog::{MockCatalogService, models::Category},
    };

    use crate::{
        catalog::models::tests::make_product,
        test_helpers::{TEST_USER_UUID, app_service, strict_auth, strict_carts, strict_catalog},
    };

    #[tokio::test]
    async fn test_cart_without_token_returns_401() -> TestResult {
        let service = app_service(strict_catalog(), strict_auth(), strict_carts());

        let res = TestClient::get("http://example.com/cart").send(&service).await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_with_expired_token_returns_401() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::Token(TokenError::Expired)));

        let service = app_service(strict_catalog(), auth, strict_carts());

        let res = TestClient::get("http://example.com/cart")
            .add_header(AUTHORIZATION, "Bearer stale", true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_customer_cannot_create_products() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().once().return_once(|_| {
            Ok(AuthenticatedUser {
                uuid: TEST_USER_UUID,
                role: Role::Customer,
            })
        });

        let service = app_service(strict_catalog(), auth, strict_carts());

        let res = TestClient::post("http://example.com/components")
            .add_header(AUTHORIZATION, "Bearer customer", true)
            .json(&json!({}))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_computers_path_reads_computer_category() -> TestResult {
        let uuid = Uuid::now_v7();

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_get_product()
            .once()
            .withf(move |category, u| *category == Category::Computer && u.into_uuid() == uuid)
            .return_once(|category, u| Ok(make_product(u, category)));

        let service = app_service(catalog, strict_auth(), strict_carts());

        let res = TestClient::get(format!("http://example.com/computers/{uuid}"))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
