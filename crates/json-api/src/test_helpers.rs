//! Test helpers.

use std::sync::Arc;

use rigforge_app::{
    auth::{AuthenticatedUser, MockAuthService, Role, UserUuid},
    context::AppContext,
    database::MockReadiness,
    domain::{carts::MockCartsService, catalog::MockCatalogService},
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

#[salvo::handler]
pub(crate) async fn inject_customer(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user(AuthenticatedUser {
        uuid: TEST_USER_UUID,
        role: Role::Customer,
    });

    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user(AuthenticatedUser {
        uuid: TEST_USER_UUID,
        role: Role::Admin,
    });

    ctrl.call_next(req, depot, res).await;
}

fn strict_catalog_mock() -> MockCatalogService {
    let mut catalog = MockCatalogService::new();

    catalog.expect_list_products().never();
    catalog.expect_get_product().never();
    catalog.expect_create_product().never();
    catalog.expect_update_product().never();
    catalog.expect_delete_product().never();
    catalog.expect_stock_levels().never();

    catalog
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_register().never();
    auth.expect_login().never();
    auth.expect_me().never();
    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_add_item().never();
    carts.expect_update_item().never();
    carts.expect_remove_item().never();
    carts.expect_clear_cart().never();
    carts.expect_sync_cart().never();

    carts
}

fn state(catalog: MockCatalogService, auth: MockAuthService, carts: MockCartsService) -> Arc<State> {
    state_with_readiness(catalog, auth, carts, MockReadiness::new())
}

fn state_with_readiness(
    catalog: MockCatalogService,
    auth: MockAuthService,
    carts: MockCartsService,
    readiness: MockReadiness,
) -> Arc<State> {
    State::from_app_context(AppContext {
        catalog: Arc::new(catalog),
        auth: Arc::new(auth),
        carts: Arc::new(carts),
        readiness: Arc::new(readiness),
    })
}

pub(crate) fn readiness_service(readiness: MockReadiness, route: Router) -> Service {
    let state = state_with_readiness(
        strict_catalog_mock(),
        strict_auth_mock(),
        strict_carts_mock(),
        readiness,
    );

    Service::new(Router::new().hoop(inject(state)).push(route))
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state(strict_catalog_mock(), auth, strict_carts_mock())
}

pub(crate) fn auth_service(auth: MockAuthService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_auth(auth)))
            .push(route),
    )
}

pub(crate) fn auth_service_as_customer(auth: MockAuthService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_auth(auth)))
            .hoop(inject_customer)
            .push(route),
    )
}

pub(crate) fn catalog_service(catalog: MockCatalogService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(catalog, strict_auth_mock(), strict_carts_mock())))
            .push(route),
    )
}

pub(crate) fn catalog_service_as_admin(catalog: MockCatalogService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(catalog, strict_auth_mock(), strict_carts_mock())))
            .hoop(inject_admin)
            .push(route),
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(strict_catalog_mock(), strict_auth_mock(), carts)))
            .hoop(inject_customer)
            .push(route),
    )
}

pub(crate) fn app_service(
    catalog: MockCatalogService,
    auth: MockAuthService,
    carts: MockCartsService,
) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(catalog, auth, carts)))
            .push(crate::router::app_router()),
    )
}

pub(crate) fn strict_catalog() -> MockCatalogService {
    strict_catalog_mock()
}

pub(crate) fn strict_auth() -> MockAuthService {
    strict_auth_mock()
}

pub(crate) fn strict_carts() -> MockCartsService {
    strict_carts_mock()
}
