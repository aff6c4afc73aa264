//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tokio::task;
use tracing::info;

use crate::{
    auth::{
        AuthServiceError, AuthenticatedUser, IssuedToken, JwtService, NewUser, Role, User,
        UserUuid, hash_password, normalize_email,
        repository::{NewUserRecord, PgAuthRepository},
        verify_password,
    },
    database::Db,
};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
    jwt: JwtService,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, jwt: JwtService) -> Self {
        Self {
            db,
            repository: PgAuthRepository::new(),
            jwt,
        }
    }

    /// Create a user with the given role without issuing a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::InvalidData`] for malformed input,
    /// [`AuthServiceError::AlreadyExists`] for a taken email, or a storage error.
    pub async fn create_user(&self, user: NewUser, role: Role) -> Result<User, AuthServiceError> {
        validate_new_user(&user)?;

        let email = normalize_email(&user.email);
        let password = user.password;
        let password_hash = task::spawn_blocking(move || hash_password(&password)).await??;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_user(
                &mut tx,
                NewUserRecord {
                    uuid: UserUuid::new(),
                    name: user.name.trim(),
                    email: &email,
                    password_hash: &password_hash,
                    role,
                },
            )
            .await?;

        tx.commit().await?;

        info!(user = %created.uuid, role = %role, "created user");

        Ok(created)
    }

    /// Grant the admin role to an existing user.
    ///
    /// Tokens issued before the promotion keep their old role until they expire.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::NotFound`] for an unknown email, or a storage error.
    pub async fn promote_to_admin(&self, email: &str) -> Result<User, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .set_user_role(&mut tx, &normalize_email(email), Role::Admin)
            .await?;

        tx.commit().await?;

        info!(user = %user.uuid, "promoted user to admin");

        Ok(user)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn register(&self, user: NewUser) -> Result<IssuedToken, AuthServiceError> {
        let created = self.create_user(user, Role::Customer).await?;

        Ok(self.jwt.issue(created.uuid, created.role, Timestamp::now())?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let credentials = self
            .repository
            .find_user_by_email(&mut tx, &normalize_email(email))
            .await?;

        tx.commit().await?;

        let Some(credentials) = credentials else {
            return Err(AuthServiceError::InvalidCredentials);
        };

        let password = password.to_string();
        let password_hash = credentials.password_hash;

        let valid = task::spawn_blocking(move || verify_password(&password, &password_hash)).await?;

        if !valid {
            return Err(AuthServiceError::InvalidCredentials);
        }

        Ok(self
            .jwt
            .issue(credentials.user.uuid, credentials.user.role, Timestamp::now())?)
    }

    async fn me(&self, user: UserUuid) -> Result<User, AuthServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError> {
        Ok(self.jwt.verify(bearer_token)?)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a customer account and issue its first token.
    async fn register(&self, user: NewUser) -> Result<IssuedToken, AuthServiceError>;

    /// Exchange credentials for a token.
    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthServiceError>;

    /// Profile of the given user.
    async fn me(&self, user: UserUuid) -> Result<User, AuthServiceError>;

    /// Resolve a bearer token to the user it was issued for.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AuthenticatedUser, AuthServiceError>;
}

fn validate_new_user(user: &NewUser) -> Result<(), AuthServiceError> {
    if user.name.trim().is_empty() {
        return Err(AuthServiceError::InvalidData("name is required"));
    }

    if !user.email.contains('@') {
        return Err(AuthServiceError::InvalidData("a valid email is required"));
    }

    if user.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthServiceError::InvalidData(
            "password must be at least 6 characters",
        ));
    }

    Ok(())
}
