//! Current User Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rigforge_app::auth::User;

use crate::{auth::into_status_error, extensions::*, state::State};

/// Signed-in user profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,

    /// `customer` or `admin`
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.uuid.into(),
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
        }
    }
}

/// Current User Handler
#[endpoint(
    tags("auth"),
    summary = "Current User",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let user = state
        .app
        .auth
        .me(user.uuid)
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use rigforge_app::auth::{AuthServiceError, MockAuthService, Role};

    use crate::test_helpers::{TEST_USER_UUID, auth_service_as_customer};

    use super::*;

    fn make_service(auth: MockAuthService) -> Service {
        auth_service_as_customer(auth, Router::with_path("auth/me").get(handler))
    }

    #[tokio::test]
    async fn test_me_returns_profile() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_me()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|uuid| {
                Ok(User {
                    uuid,
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    role: Role::Admin,
                    created_at: Timestamp::UNIX_EPOCH,
                    updated_at: Timestamp::UNIX_EPOCH,
                })
            });

        let mut res = TestClient::get("http://example.com/auth/me")
            .send(&make_service(auth))
            .await;

        let body: UserResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.id, TEST_USER_UUID.into_uuid());
        assert_eq!(body.role, "admin");

        Ok(())
    }

    #[tokio::test]
    async fn test_me_for_deleted_user_returns_404() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_me()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com/auth/me")
            .send(&make_service(auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
