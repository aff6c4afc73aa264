//! Cart Models

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{domain::catalog::models::ProductUuid, uuids::TypedUuid};

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Cart Model: every item owned by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub item_count: u64,
}

impl Cart {
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total = items.iter().map(CartItem::subtotal).sum();
        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();

        Self {
            items,
            total,
            item_count,
        }
    }
}

/// CartItem Model, joined with its product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub name: String,
    pub image_url: Option<String>,
    /// Effective price of the product right now.
    pub price: Decimal,
    pub list_price: Decimal,
    pub stock: u32,
    pub quantity: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItem {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Requested line of a full cart replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncItem {
    pub product_uuid: ProductUuid,
    pub quantity: i64,
}
