//! Auth service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tokio::task::JoinError;

use crate::auth::TokenError;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("user already exists")]
    AlreadyExists,

    #[error("user not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid data: {0}")]
    InvalidData(&'static str),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("token processing error")]
    Token(#[from] TokenError),

    #[error("password hashing failed")]
    PasswordHash(#[source] argon2::password_hash::Error),

    #[error("password hashing task failed")]
    Task(#[from] JoinError),
}

impl From<Error> for AuthServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::CheckViolation) => Self::InvalidData("value violates a constraint"),
            Some(_) | None => Self::Sql(error),
        }
    }
}

impl From<argon2::password_hash::Error> for AuthServiceError {
    fn from(error: argon2::password_hash::Error) -> Self {
        Self::PasswordHash(error)
    }
}
