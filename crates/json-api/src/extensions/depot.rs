//! Depot helper extensions.

use std::any::Any;

use rigforge_app::{auth::AuthenticatedUser, domain::catalog::models::Category};
use salvo::prelude::{Depot, StatusError};

const AUTHENTICATED_USER_KEY: &str = "authenticated_user";
const CATEGORY_KEY: &str = "category";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_user(&mut self, user: AuthenticatedUser);

    fn user_or_401(&self) -> Result<AuthenticatedUser, StatusError>;

    fn insert_category(&mut self, category: Category);

    fn category_or_500(&self) -> Result<Category, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_user(&mut self, user: AuthenticatedUser) {
        self.insert(AUTHENTICATED_USER_KEY, user);
    }

    fn user_or_401(&self) -> Result<AuthenticatedUser, StatusError> {
        self.get::<AuthenticatedUser>(AUTHENTICATED_USER_KEY)
            .copied()
            .map_err(|_ignored| StatusError::unauthorized().brief("Authentication required"))
    }

    fn insert_category(&mut self, category: Category) {
        self.insert(CATEGORY_KEY, category);
    }

    fn category_or_500(&self) -> Result<Category, StatusError> {
        self.get::<Category>(CATEGORY_KEY)
            .copied()
            .map_err(|_ignored| StatusError::internal_server_error())
    }
}

#[cfg(test)]
mod tests {
    use rigforge_app::auth::{Role, UserUuid};
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn missing_user_is_unauthorized() {
        let depot = Depot::new();

        let result = depot.user_or_401();

        assert!(
            matches!(&result, Err(error) if error.code == StatusCode::UNAUTHORIZED),
            "expected 401, got {result:?}"
        );
    }

    #[test]
    fn inserted_user_is_returned() {
        let mut depot = Depot::new();
        let user = AuthenticatedUser {
            uuid: UserUuid::new(),
            role: Role::Customer,
        };

        depot.insert_user(user);

        assert_eq!(depot.user_or_401().ok(), Some(user), "expected inserted user");
    }

    #[test]
    fn inserted_category_is_returned() {
        let mut depot = Depot::new();

        depot.insert_category(Category::Computer);

        assert_eq!(
            depot.category_or_500().ok(),
            Some(Category::Computer),
            "expected inserted category"
        );
    }
}
