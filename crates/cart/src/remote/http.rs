//! REST client for the storefront server.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{identity::Identity, lines::ProductId};

use super::{AuthToken, CartApi, CatalogApi, IdentityApi, RemoteError, StockLevel, SyncItem};

/// Configuration for connecting to the storefront server.
#[derive(Debug, Clone)]
pub struct StorefrontClientConfig {
    /// Server address, e.g. `"http://localhost:8698"`.
    pub base_url: String,
}

/// HTTP implementation of the remote storefront traits.
#[derive(Debug, Clone)]
pub struct HttpStorefrontClient {
    config: StorefrontClientConfig,
    http: Client,
}

impl HttpStorefrontClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: StorefrontClientConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: AuthToken,
}

#[derive(Debug, Serialize)]
struct SyncRequest {
    items: Vec<SyncItem>,
}

#[derive(Debug, Serialize)]
struct StockRequest {
    uuids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
struct StockResponse {
    stock: Vec<StockEntry>,
}

#[derive(Debug, Deserialize)]
struct StockEntry {
    uuid: Uuid,
    stock: i64,
}

#[async_trait]
impl IdentityApi for HttpStorefrontClient {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthToken, RemoteError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&Credentials {
                name: Some(name),
                email,
                password,
            })
            .send()
            .await?;

        let parsed: TokenResponse = ensure_success(response).await?.json().await?;

        Ok(parsed.token)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthToken, RemoteError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&Credentials {
                name: None,
                email,
                password,
            })
            .send()
            .await?;

        let parsed: TokenResponse = ensure_success(response).await?.json().await?;

        Ok(parsed.token)
    }

    async fn me(&self, token: &AuthToken) -> Result<Identity, RemoteError> {
        let response = self
            .http
            .get(self.url("/auth/me"))
            .bearer_auth(token.expose())
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }
}

#[async_trait]
impl CartApi for HttpStorefrontClient {
    async fn sync(&self, token: &AuthToken, items: Vec<SyncItem>) -> Result<(), RemoteError> {
        debug!(items = items.len(), "syncing server cart");

        let response = self
            .http
            .post(self.url("/cart/sync"))
            .bearer_auth(token.expose())
            .json(&SyncRequest { items })
            .send()
            .await?;

        ensure_success(response).await?;

        Ok(())
    }

    async fn clear(&self, token: &AuthToken) -> Result<(), RemoteError> {
        let response = self
            .http
            .delete(self.url("/cart"))
            .bearer_auth(token.expose())
            .send()
            .await?;

        ensure_success(response).await?;

        Ok(())
    }
}

#[async_trait]
impl CatalogApi for HttpStorefrontClient {
    async fn stock_levels(&self, products: Vec<ProductId>) -> Result<Vec<StockLevel>, RemoteError> {
        let uuids: Vec<Uuid> = products
            .iter()
            .filter_map(|product| Uuid::parse_str(product.as_str()).ok())
            .collect();

        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .post(self.url("/products/stock"))
            .json(&StockRequest { uuids })
            .send()
            .await?;

        let parsed: StockResponse = ensure_success(response).await?.json().await?;

        Ok(parsed
            .stock
            .into_iter()
            .map(|entry| StockLevel {
                product_id: ProductId::new(entry.uuid.to_string()),
                stock: entry.stock,
            })
            .collect())
    }
}

async fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();

    Err(status_error(status, text))
}

fn status_error(status: StatusCode, body: String) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED => RemoteError::Unauthorized,
        StatusCode::BAD_REQUEST => RemoteError::InvalidRequest(body),
        StatusCode::CONFLICT => RemoteError::Conflict(body),
        _ => RemoteError::UnexpectedResponse(format!("request failed with status {status}: {body}")),
    }
}
