//! Cart response bodies.

use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigforge_app::domain::carts::models::{Cart, CartItem};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    pub id: Uuid,
    pub component_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,

    /// Current effective unit price
    #[salvo(schema(value_type = f64))]
    pub price: Decimal,

    #[salvo(schema(value_type = f64))]
    pub list_price: Decimal,

    pub stock: u32,
    pub quantity: u32,

    #[salvo(schema(value_type = f64))]
    pub subtotal: Decimal,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            subtotal: item.subtotal(),
            id: item.uuid.into(),
            component_id: item.product_uuid.into(),
            name: item.name,
            image_url: item.image_url,
            price: item.price,
            list_price: item.list_price,
            stock: item.stock,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    pub items: Vec<CartItemResponse>,

    #[salvo(schema(value_type = f64))]
    pub total: Decimal,

    pub item_count: u64,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            items: cart.items.into_iter().map(Into::into).collect(),
            total: cart.total,
            item_count: cart.item_count,
        }
    }
}
