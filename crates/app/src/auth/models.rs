//! Auth data models.

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;

use crate::{auth::AuthServiceError, uuids::TypedUuid};

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Access level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(AuthServiceError::InvalidData("unknown role")),
        }
    }
}

/// User Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uuid: UserUuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Registration payload.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Debug for NewUser {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

/// A user row with its password hash, only used to check credentials.
#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Signed bearer token handed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Identity resolved from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub uuid: UserUuid,
    pub role: Role,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Normalise an email for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
