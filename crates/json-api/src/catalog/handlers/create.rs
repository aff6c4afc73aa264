//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigforge_app::domain::catalog::models::{NewProduct, ProductUuid};

use crate::{
    catalog::{
        collection_path,
        errors::into_status_error,
        models::{ProductRequest, ProductResponse},
    },
    extensions::*,
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateProductRequest {
    /// Optional client-chosen identifier; generated when omitted
    #[serde(default)]
    pub id: Option<Uuid>,

    #[serde(flatten)]
    pub product: ProductRequest,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(request: CreateProductRequest) -> Self {
        NewProduct {
            uuid: request.id.map_or_else(ProductUuid::new, ProductUuid::from_uuid),
            fields: request.product.into(),
        }
    }
}

/// Create Product Handler
#[endpoint(
    tags("catalog"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "catalog.create",
    skip(json, depot, res),
    fields(category = tracing::field::Empty, product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let category = depot.category_or_500()?;

    let product = state
        .app
        .catalog
        .create_product(category, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    let span = tracing::Span::current();

    span.record("category", tracing::field::display(category));
    span.record("product_uuid", tracing::field::display(product.uuid));

    res.add_header(
        LOCATION,
        format!("{}/{}", collection_path(category), product.uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use rigforge_app::domain::catalog::{
        CatalogServiceError, MockCatalogService, models::Category,
    };

    use crate::{
        catalog::{computers, models::tests::make_product},
        test_helpers::catalog_service_as_admin,
    };

    use super::*;

    fn make_service(catalog: MockCatalogService) -> Service {
        catalog_service_as_admin(
            catalog,
            Router::with_path("computers").hoop(computers).post(handler),
        )
    }

    fn body(id: Uuid) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Gaming Tower",
            "type": "gaming",
            "brand": "Forgeworks",
            "price": 1899.99,
            "discountPrice": 1799,
            "stock": 2,
            "specs": { "cpu": "Ryzen 7", "ram": "32GB" }
        })
    }

    #[tokio::test]
    async fn test_create_product_success() -> TestResult {
        let uuid = ProductUuid::new();

        let mut catalog = MockCatalogService::new();

        catalog
            .expect_create_product()
            .once()
            .withf(move |category, new| {
                *category == Category::Computer
                    && new.uuid == uuid
                    && new.fields.kind == "gaming"
                    && new.fields.price == dec!(1899.99)
                    && new.fields.discount_price == Some(dec!(1799))
                    && new.fields.specs == json!({ "cpu": "Ryzen 7", "ram": "32GB" })
            })
            .return_once(move |category, _| Ok(make_product(uuid, category)));

        let mut res = TestClient::post("http://example.com/computers")
            .json(&body(uuid.into_uuid()))
            .send(&make_service(catalog))
            .await;

        let response: ProductResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/computers/{uuid}").as_str()));
        assert_eq!(response.id, uuid.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_conflict_returns_409() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_create_product()
            .once()
            .return_once(|_, _| Err(CatalogServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/computers")
            .json(&body(Uuid::now_v7()))
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_invalid_data_returns_400() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_create_product()
            .once()
            .return_once(|_, _| {
                Err(CatalogServiceError::InvalidData(
                    "discount price must not exceed price",
                ))
            });

        let res = TestClient::post("http://example.com/computers")
            .json(&body(Uuid::now_v7()))
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_malformed_body_returns_400() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog.expect_create_product().never();

        let res = TestClient::post("http://example.com/computers")
            .json(&json!({ "name": "Gaming Tower" }))
            .send(&make_service(catalog))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
