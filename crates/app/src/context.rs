//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, JwtConfig, JwtService, PgAuthService},
    database::{self, Db, PoolSettings, Readiness},
    domain::{
        carts::{CartsService, PgCartsService},
        catalog::{CatalogService, PgCatalogService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub auth: Arc<dyn AuthService>,
    pub carts: Arc<dyn CartsService>,
    pub readiness: Arc<dyn Readiness>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(
        url: &str,
        pool: PoolSettings,
        jwt: JwtConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect_with(url, pool)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrate)?;

        let db = Db::new(pool);

        Ok(Self {
            catalog: Arc::new(PgCatalogService::new(db.clone())),
            auth: Arc::new(PgAuthService::new(db.clone(), JwtService::new(jwt))),
            carts: Arc::new(PgCartsService::new(db.clone())),
            readiness: Arc::new(db),
        })
    }
}
