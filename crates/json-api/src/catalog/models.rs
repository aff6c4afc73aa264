//! Catalog request and response bodies.

use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use rigforge_app::domain::catalog::models::{Product, ProductFields};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    pub id: Uuid,

    /// `component` or `computer`
    pub category: String,

    pub name: String,

    /// Product type, e.g. `gpu` or `gaming`
    #[serde(rename = "type")]
    pub kind: String,

    pub brand: String,

    #[salvo(schema(value_type = f64))]
    pub price: Decimal,

    #[salvo(schema(value_type = Option<f64>))]
    pub discount_price: Option<Decimal>,

    pub stock: u32,
    pub description: String,
    pub image_url: Option<String>,

    /// Type-specific attributes
    pub specs: Value,

    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.uuid.into(),
            category: product.category.to_string(),
            name: product.name,
            kind: product.kind,
            brand: product.brand,
            price: product.price,
            discount_price: product.discount_price,
            stock: product.stock,
            description: product.description,
            image_url: product.image_url,
            specs: product.specs,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Editable product fields, used by create and full-replace update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductRequest {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub brand: String,

    #[salvo(schema(value_type = f64))]
    pub price: Decimal,

    #[serde(default)]
    #[salvo(schema(value_type = Option<f64>))]
    pub discount_price: Option<Decimal>,

    pub stock: i64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default = "empty_specs")]
    pub specs: Value,
}

impl From<ProductRequest> for ProductFields {
    fn from(request: ProductRequest) -> Self {
        ProductFields {
            name: request.name,
            kind: request.kind,
            brand: request.brand,
            price: request.price,
            discount_price: request.discount_price,
            stock: request.stock,
            description: request.description,
            image_url: request.image_url,
            specs: request.specs,
        }
    }
}

fn empty_specs() -> Value {
    Value::Object(Map::new())
}
