//! Catalog Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::{domain::catalog::errors::CatalogServiceError, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Catalog section a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Component,
    Computer,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Computer => "computer",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "component" => Ok(Self::Component),
            "computer" => Ok(Self::Computer),
            _ => Err(CatalogServiceError::InvalidData("unknown category")),
        }
    }
}

/// Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub uuid: ProductUuid,
    pub category: Category,
    pub name: String,
    pub kind: String,
    pub brand: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: u32,
    pub description: String,
    pub image_url: Option<String>,
    pub specs: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Price a buyer pays: the discount price when present.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Editable product fields, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub kind: String,
    pub brand: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i64,
    pub description: String,
    pub image_url: Option<String>,
    pub specs: Value,
}

impl ProductFields {
    /// Check the field invariants enforced by the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::InvalidData`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), CatalogServiceError> {
        if self.name.trim().is_empty() {
            return Err(CatalogServiceError::InvalidData("name is required"));
        }

        if self.price.is_sign_negative() {
            return Err(CatalogServiceError::InvalidData("price must not be negative"));
        }

        if let Some(discount_price) = self.discount_price {
            if discount_price.is_sign_negative() {
                return Err(CatalogServiceError::InvalidData(
                    "discount price must not be negative",
                ));
            }

            if discount_price > self.price {
                return Err(CatalogServiceError::InvalidData(
                    "discount price must not exceed price",
                ));
            }
        }

        if self.stock < 0 || i32::try_from(self.stock).is_err() {
            return Err(CatalogServiceError::InvalidData("stock is out of range"));
        }

        if !self.specs.is_object() {
            return Err(CatalogServiceError::InvalidData("specs must be an object"));
        }

        Ok(())
    }
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub fields: ProductFields,
}

/// Product list filters. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Exact product type, e.g. `gpu`.
    pub kind: Option<String>,

    /// Brand, compared case-insensitively.
    pub brand: Option<String>,

    /// Lower bound on the effective price.
    pub min_price: Option<Decimal>,

    /// Upper bound on the effective price.
    pub max_price: Option<Decimal>,

    /// Case-insensitive substring of name, brand or description.
    pub search: Option<String>,
}

/// Stock Level Model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub uuid: ProductUuid,
    pub stock: u32,
}
