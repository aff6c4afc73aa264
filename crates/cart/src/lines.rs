//! Cart Lines

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a catalog entry (component or computer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The catalog fields needed to put a product into a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
}

impl ProductSnapshot {
    /// Price charged for the product: the discount price when one is active.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

/// One product-quantity-price record within a cart.
///
/// Prices are snapshotted when the line is first created and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub list_price: Decimal,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartLine {
    /// Create a single-quantity line from a catalog snapshot.
    #[must_use]
    pub fn from_product(product: &ProductSnapshot) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity: 1,
            unit_price: product.effective_price(),
            list_price: product.price,
            name: product.name.clone(),
            image_url: product.image_url.clone(),
        }
    }

    /// Line subtotal (`unit_price * quantity`).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Point-in-time view of a cart published to observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: u64,
}

impl CartSnapshot {
    /// Build a snapshot, computing the aggregates from the given lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.to_vec(),
            total: total(lines),
            item_count: item_count(lines),
        }
    }
}

/// Sum of line subtotals.
#[must_use]
pub fn total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::subtotal).sum()
}

/// Sum of line quantities.
#[must_use]
pub fn item_count(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}
