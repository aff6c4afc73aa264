//! Auth repository.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::auth::models::{Role, User, UserCredentials, UserUuid};

const FIND_USER_BY_EMAIL_SQL: &str = include_str!("sql/find_user_by_email.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const SET_USER_ROLE_SQL: &str = include_str!("sql/set_user_role.sql");

/// Insert payload for a user whose password is already hashed.
#[derive(Debug)]
pub(crate) struct NewUserRecord<'a> {
    pub uuid: UserUuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAuthRepository;

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_user_by_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        query_as::<Postgres, UserCredentials>(FIND_USER_BY_EMAIL_SQL)
            .bind(email)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: NewUserRecord<'_>,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.name)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_user_role(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        query_as::<Postgres, User>(SET_USER_ROLE_SQL)
            .bind(email)
            .bind(role.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        let role = role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for UserCredentials {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: User::from_row(row)?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}
