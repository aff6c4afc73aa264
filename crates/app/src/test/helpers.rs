//! Test Helpers

use rust_decimal::Decimal;
use serde_json::json;

use crate::{
    auth::{AuthServiceError, NewUser, Role, User},
    domain::catalog::{
        CatalogService, CatalogServiceError,
        models::{Category, NewProduct, Product, ProductFields, ProductUuid},
    },
    test::TestContext,
};

pub(crate) fn product_fields(name: &str, kind: &str, price: Decimal) -> ProductFields {
    ProductFields {
        name: name.to_string(),
        kind: kind.to_string(),
        brand: "Forgeworks".to_string(),
        price,
        discount_price: None,
        stock: 10,
        description: format!("{name} for test builds"),
        image_url: None,
        specs: json!({ "vram": "12GB" }),
    }
}

pub(crate) fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        password: "correct-horse".to_string(),
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: Decimal,
    discount_price: Option<Decimal>,
) -> Result<Product, CatalogServiceError> {
    ctx.catalog
        .create_product(
            Category::Component,
            NewProduct {
                uuid: ProductUuid::new(),
                fields: ProductFields {
                    discount_price,
                    ..product_fields(name, "misc", price)
                },
            },
        )
        .await
}

pub(crate) async fn create_user(ctx: &TestContext, email: &str) -> Result<User, AuthServiceError> {
    ctx.auth.create_user(new_user(email), Role::Customer).await
}
