//! Remote storefront API.
//!
//! The cart crate only talks to the server through these traits so the storefront flows can be
//! exercised against mocks. [`HttpStorefrontClient`] implements all of them over the REST surface.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{identity::Identity, lines::ProductId};

mod http;

pub use http::{HttpStorefrontClient, StorefrontClientConfig};

/// Bearer credential issued by the identity API.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("AuthToken(..)")
    }
}

/// One line of a `POST /cart/sync` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItem {
    pub component_id: Uuid,
    pub quantity: u32,
}

/// Current stock of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub stock: i64,
}

/// Errors returned by the remote API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport or body decoding failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials were rejected or the token is missing/expired.
    #[error("unauthorized")]
    Unauthorized,

    /// The server refused the payload.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The resource already exists (e.g. the email is taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other non-success response.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Registration, login and identity lookup.
#[automock]
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Create an account and return its token.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthToken, RemoteError>;

    /// Exchange credentials for a token.
    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, RemoteError>;

    /// Identity behind a token.
    async fn me(&self, token: &AuthToken) -> Result<Identity, RemoteError>;
}

/// Server-side cart record of the signed-in identity.
#[automock]
#[async_trait]
pub trait CartApi: Send + Sync {
    /// Replace the server cart with `items`.
    async fn sync(&self, token: &AuthToken, items: Vec<SyncItem>) -> Result<(), RemoteError>;

    /// Empty the server cart.
    async fn clear(&self, token: &AuthToken) -> Result<(), RemoteError>;
}

/// Read-only catalog lookups.
#[automock]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Current stock for the given products. Unknown products are omitted.
    async fn stock_levels(&self, products: Vec<ProductId>) -> Result<Vec<StockLevel>, RemoteError>;
}
