//! Auth Handlers

pub(crate) mod login;
pub(crate) mod me;
pub(crate) mod register;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Issued bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    /// Signed token for the `Authorization: Bearer` header
    pub token: String,

    /// Expiry of the token (RFC 3339)
    pub expires_at: String,
}

impl From<rigforge_app::auth::IssuedToken> for TokenResponse {
    fn from(issued: rigforge_app::auth::IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at.to_string(),
        }
    }
}
