//! Signed bearer tokens.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{AuthenticatedUser, IssuedToken, Role, UserUuid};

/// Minimum length of the signing secret.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Token signing settings.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    ttl: SignedDuration,
    issuer: String,
}

impl JwtConfig {
    /// Validate and build token settings.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::WeakSecret`] when the secret is shorter than
    /// [`MIN_SECRET_LENGTH`], or [`TokenError::InvalidTtl`] for a non-positive lifetime.
    pub fn new(
        secret: impl Into<String>,
        ttl_minutes: i64,
        issuer: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret);
        }

        if ttl_minutes <= 0 {
            return Err(TokenError::InvalidTtl);
        }

        Ok(Self {
            secret,
            ttl: SignedDuration::from_mins(ttl_minutes),
            issuer: issuer.into(),
        })
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn ttl(&self) -> SignedDuration {
        self.ttl
    }
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("JwtConfig")
            .field("secret", &"**redacted**")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Claims carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret must be at least {MIN_SECRET_LENGTH} characters")]
    WeakSecret,

    #[error("token lifetime must be positive")]
    InvalidTtl,

    #[error("token has expired")]
    Expired,

    #[error("token is invalid")]
    Invalid,

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 tokens.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Sign a token for the given user, valid from `now` for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(
        &self,
        user: UserUuid,
        role: Role,
        now: Timestamp,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add(self.config.ttl)
            .map_err(|_overflow| TokenError::InvalidTtl)?;

        let claims = Claims {
            sub: user.into_uuid(),
            role: role.as_str().to_string(),
            iat: now.as_second(),
            exp: expires_at.as_second(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token's signature, issuer and expiry.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] for expired tokens and [`TokenError::Invalid`] for
    /// anything else that fails verification.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);

        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        let role = data
            .claims
            .role
            .parse::<Role>()
            .map_err(|_unknown| TokenError::Invalid)?;

        Ok(AuthenticatedUser {
            uuid: UserUuid::from_uuid(data.claims.sub),
            role,
        })
    }
}
