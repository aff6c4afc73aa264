//! Storefront session orchestration.

use std::{
    collections::HashMap,
    fmt::{Debug, Formatter, Result as FmtResult},
    future::Future,
    sync::Arc,
};

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    identity::Identity,
    lines::{CartLine, ProductId},
    manager::{CartError, CartManager},
    remote::{
        AuthToken, CartApi, CatalogApi, HttpStorefrontClient, IdentityApi, RemoteError, SyncItem,
    },
    session::{Session, SessionError},
    storage::CartStorage,
};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors returned by storefront flows.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The submitted form failed validation; nothing was sent.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Outcome of a simulated checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub item_count: u64,
    pub total: Decimal,
}

/// One storefront session: identity, active cart and the remote API.
///
/// Network calls that only mirror local state (server cart sync and clear) run on spawned tasks
/// in submission order. Their failures are logged and never affect the local cart.
pub struct Storefront {
    session: Session,
    cart: CartManager,
    identity_api: Arc<dyn IdentityApi>,
    cart_api: Arc<dyn CartApi>,
    catalog_api: Arc<dyn CatalogApi>,
    token: Option<AuthToken>,
    pending: Option<JoinHandle<()>>,
}

impl Debug for Storefront {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Storefront")
            .field("session", &self.session)
            .field("cart", &self.cart)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create an anonymous storefront over the given storage and remote APIs.
    pub fn new(
        storage: Arc<dyn CartStorage>,
        identity_api: Arc<dyn IdentityApi>,
        cart_api: Arc<dyn CartApi>,
        catalog_api: Arc<dyn CatalogApi>,
    ) -> Self {
        let session = Session::new();
        let cart = CartManager::new(storage, session.subscribe());

        Self {
            session,
            cart,
            identity_api,
            cart_api,
            catalog_api,
            token: None,
            pending: None,
        }
    }

    /// Create an anonymous storefront talking to the REST server.
    pub fn with_http_client(storage: Arc<dyn CartStorage>, client: HttpStorefrontClient) -> Self {
        let client = Arc::new(client);

        Self::new(storage, client.clone(), client.clone(), client)
    }

    /// Sign in with existing credentials and merge the guest cart into the user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidInput`] for malformed credentials (no request is made),
    /// [`StorefrontError::Remote`] when the server rejects them (the session returns to
    /// anonymous and the cart is untouched), or [`StorefrontError::Session`] when a user is
    /// already signed in.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity, StorefrontError> {
        validate_email(email)?;
        validate_password(password)?;

        self.session.begin_authentication()?;

        let token = self.identity_api.login(email, password).await;

        self.finish_authentication(token).await
    }

    /// Create an account, sign in and merge the guest cart into the new user's cart.
    ///
    /// # Errors
    ///
    /// Same as [`Storefront::login`]; a taken email surfaces as [`RemoteError::Conflict`].
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, StorefrontError> {
        if name.trim().is_empty() {
            return Err(StorefrontError::InvalidInput("name is required"));
        }

        validate_email(email)?;
        validate_password(password)?;

        self.session.begin_authentication()?;

        let token = self.identity_api.register(name.trim(), email, password).await;

        self.finish_authentication(token).await
    }

    /// Sign out. The user's cart stays persisted and the guest cart becomes active.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Session`] when nobody is signed in.
    pub fn sign_out(&mut self) -> Result<(), StorefrontError> {
        self.session.sign_out()?;
        self.token = None;
        self.cart.refresh_identity();

        Ok(())
    }

    /// Simulated checkout: empties the local cart and, when signed in, the server cart.
    ///
    /// Always succeeds. Must be called from within a Tokio runtime.
    pub fn checkout(&mut self) -> CheckoutSummary {
        let summary = CheckoutSummary {
            item_count: self.cart.item_count(),
            total: self.cart.total(),
        };

        if let Err(error) = self.cart.clear() {
            warn!("failed to clear cart after checkout: {error}");
        }

        if let Some(token) = self.token.clone() {
            let api = Arc::clone(&self.cart_api);

            self.enqueue(async move {
                if let Err(error) = api.clear(&token).await {
                    warn!("failed to clear server cart: {error}");
                }
            });
        }

        info!(
            item_count = summary.item_count,
            total = %summary.total,
            "checkout completed"
        );

        summary
    }

    /// Mirror the current cart to the server when signed in.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request_sync(&mut self) {
        let Some(token) = self.token.clone() else {
            return;
        };

        let items = sync_items(self.cart.lines());
        let api = Arc::clone(&self.cart_api);

        self.enqueue(async move {
            match api.sync(&token, items).await {
                Ok(()) => debug!("server cart synced"),
                Err(error) => warn!("server cart sync failed: {error}"),
            }
        });
    }

    /// Wait for queued server cart calls to finish.
    pub async fn flush_sync(&mut self) {
        if let Some(pending) = self.pending.take()
            && let Err(error) = pending.await
        {
            warn!("server cart task failed: {error}");
        }
    }

    /// Current stock of every product in the cart, for clamping quantity inputs.
    ///
    /// Products the server does not know are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Remote`] when the lookup fails.
    pub async fn stock_levels(&self) -> Result<HashMap<ProductId, i64>, StorefrontError> {
        let products = self
            .cart
            .lines()
            .iter()
            .map(|line| line.product_id.clone())
            .collect::<Vec<_>>();

        if products.is_empty() {
            return Ok(HashMap::new());
        }

        let levels = self.catalog_api.stock_levels(products).await?;

        Ok(levels
            .into_iter()
            .map(|level| (level.product_id, level.stock))
            .collect())
    }

    /// Session state holder.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Active cart.
    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.cart
    }

    /// Active cart, for mutations.
    pub fn cart_mut(&mut self) -> &mut CartManager {
        &mut self.cart
    }

    /// Bearer token of the signed-in user.
    #[must_use]
    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    async fn finish_authentication(
        &mut self,
        token: Result<AuthToken, RemoteError>,
    ) -> Result<Identity, StorefrontError> {
        let authenticated = match token {
            Ok(token) => self
                .identity_api
                .me(&token)
                .await
                .map(|identity| (token, identity)),
            Err(error) => Err(error),
        };

        let (token, identity) = match authenticated {
            Ok(authenticated) => authenticated,
            Err(error) => {
                self.session.reject_authentication()?;

                warn!("authentication failed: {error}");

                return Err(error.into());
            }
        };

        self.session.complete_authentication(identity.clone())?;
        self.token = Some(token);

        if let Err(error) = self.cart.merge_on_authenticate(&identity) {
            warn!("guest cart merge was not fully persisted: {error}");
        }

        self.request_sync();

        Ok(identity)
    }

    fn enqueue<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let previous = self.pending.take();

        self.pending = Some(tokio::spawn(async move {
            if let Some(previous) = previous
                && let Err(error) = previous.await
            {
                warn!("server cart task failed: {error}");
            }

            task.await;
        }));
    }
}

fn validate_email(email: &str) -> Result<(), StorefrontError> {
    let email = email.trim();

    if email.is_empty() || !email.contains('@') {
        return Err(StorefrontError::InvalidInput("a valid email is required"));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), StorefrontError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(StorefrontError::InvalidInput(
            "password must be at least 6 characters",
        ));
    }

    Ok(())
}

fn sync_items(lines: &[CartLine]) -> Vec<SyncItem> {
    lines
        .iter()
        .filter_map(|line| match Uuid::parse_str(line.product_id.as_str()) {
            Ok(component_id) => Some(SyncItem {
                component_id,
                quantity: line.quantity,
            }),
            Err(_) => {
                debug!(product = %line.product_id, "skipping non-catalog line in sync");

                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        identity::Role,
        lines::ProductSnapshot,
        partition::PartitionKey,
        remote::{MockCartApi, MockCatalogApi, MockIdentityApi, StockLevel},
        session::SessionState,
        storage::MemoryStorage,
    };

    use super::*;

    fn product(price: Decimal) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(Uuid::now_v7().to_string()),
            name: "RTX 4070".to_string(),
            price,
            discount_price: None,
            image_url: None,
        }
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::now_v7(),
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
            role: Role::Customer,
        }
    }

    fn accepting_identity_api() -> MockIdentityApi {
        let mut api = MockIdentityApi::new();

        api.expect_login()
            .once()
            .withf(|email, password| email == "a@b.com" && password == "hunter22")
            .return_once(|_, _| Ok(AuthToken::new("jwt")));
        api.expect_me()
            .once()
            .withf(|token| token.expose() == "jwt")
            .return_once(|_| Ok(identity()));
        api.expect_register().never();

        api
    }

    fn storefront(
        storage: &MemoryStorage,
        identity_api: MockIdentityApi,
        cart_api: MockCartApi,
        catalog_api: MockCatalogApi,
    ) -> Storefront {
        Storefront::new(
            Arc::new(storage.clone()),
            Arc::new(identity_api),
            Arc::new(cart_api),
            Arc::new(catalog_api),
        )
    }

    #[tokio::test]
    async fn login_merges_guest_cart_and_syncs_it() -> TestResult {
        let storage = MemoryStorage::new();
        let gpu = product(dec!(599));
        let gpu_id = Uuid::parse_str(gpu.id.as_str())?;

        let mut cart_api = MockCartApi::new();

        cart_api
            .expect_sync()
            .once()
            .withf(move |_, items| {
                items
                    == &vec![SyncItem {
                        component_id: gpu_id,
                        quantity: 2,
                    }]
            })
            .return_once(|_, _| Ok(()));
        cart_api.expect_clear().never();

        let mut store = storefront(
            &storage,
            accepting_identity_api(),
            cart_api,
            MockCatalogApi::new(),
        );

        store.cart_mut().add(&gpu)?;
        store.cart_mut().add(&gpu)?;

        let signed_in = store.login("a@b.com", "hunter22").await?;

        store.flush_sync().await;

        assert_eq!(signed_in.email, "a@b.com");
        assert_eq!(store.cart().partition(), &PartitionKey::for_email("a@b.com"));
        assert_eq!(store.cart().item_count(), 2);
        assert!(storage.read(&PartitionKey::Guest)?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn rejected_credentials_leave_cart_untouched() -> TestResult {
        let storage = MemoryStorage::new();
        let mut identity_api = MockIdentityApi::new();

        identity_api
            .expect_login()
            .once()
            .return_once(|_, _| Err(RemoteError::Unauthorized));
        identity_api.expect_me().never();

        let mut cart_api = MockCartApi::new();

        cart_api.expect_sync().never();

        let mut store = storefront(&storage, identity_api, cart_api, MockCatalogApi::new());

        store.cart_mut().add(&product(dec!(120)))?;

        let result = store.login("a@b.com", "wrong-password").await;

        assert!(
            matches!(result, Err(StorefrontError::Remote(RemoteError::Unauthorized))),
            "expected Unauthorized, got {result:?}"
        );
        assert_eq!(store.session().state(), SessionState::Anonymous);
        assert_eq!(store.cart().partition(), &PartitionKey::Guest);
        assert_eq!(store.cart().item_count(), 1);
        assert!(store.token().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn malformed_credentials_are_rejected_locally() {
        let storage = MemoryStorage::new();
        let mut identity_api = MockIdentityApi::new();

        identity_api.expect_login().never();
        identity_api.expect_register().never();

        let mut store = storefront(
            &storage,
            identity_api,
            MockCartApi::new(),
            MockCatalogApi::new(),
        );

        assert!(matches!(
            store.login("not-an-email", "hunter22").await,
            Err(StorefrontError::InvalidInput(_))
        ));
        assert!(matches!(
            store.login("a@b.com", "short").await,
            Err(StorefrontError::InvalidInput(_))
        ));
        assert!(matches!(
            store.register("  ", "a@b.com", "hunter22").await,
            Err(StorefrontError::InvalidInput(_))
        ));
        assert_eq!(store.session().state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn taken_email_returns_to_anonymous() {
        let storage = MemoryStorage::new();
        let mut identity_api = MockIdentityApi::new();

        identity_api
            .expect_register()
            .once()
            .withf(|name, email, _| name == "Ada" && email == "a@b.com")
            .return_once(|_, _, _| Err(RemoteError::Conflict("email taken".to_string())));
        identity_api.expect_me().never();

        let mut store = storefront(
            &storage,
            identity_api,
            MockCartApi::new(),
            MockCatalogApi::new(),
        );

        let result = store.register(" Ada ", "a@b.com", "hunter22").await;

        assert!(
            matches!(result, Err(StorefrontError::Remote(RemoteError::Conflict(_)))),
            "expected Conflict, got {result:?}"
        );
        assert_eq!(store.session().state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn failed_sync_does_not_affect_local_cart() -> TestResult {
        let storage = MemoryStorage::new();
        let mut cart_api = MockCartApi::new();

        cart_api
            .expect_sync()
            .once()
            .return_once(|_, _| Err(RemoteError::UnexpectedResponse("boom".to_string())));

        let mut store = storefront(
            &storage,
            accepting_identity_api(),
            cart_api,
            MockCatalogApi::new(),
        );

        store.cart_mut().add(&product(dec!(80)))?;
        store.login("a@b.com", "hunter22").await?;
        store.flush_sync().await;

        assert_eq!(store.cart().item_count(), 1);
        assert_eq!(
            store.session().state().identity().map(|i| i.email.as_str()),
            Some("a@b.com")
        );

        Ok(())
    }

    #[tokio::test]
    async fn checkout_clears_local_and_server_carts() -> TestResult {
        let storage = MemoryStorage::new();
        let mut cart_api = MockCartApi::new();

        cart_api.expect_sync().once().return_once(|_, _| Ok(()));
        cart_api
            .expect_clear()
            .once()
            .withf(|token| token.expose() == "jwt")
            .return_once(|_| Ok(()));

        let mut store = storefront(
            &storage,
            accepting_identity_api(),
            cart_api,
            MockCatalogApi::new(),
        );

        store.login("a@b.com", "hunter22").await?;
        store.cart_mut().add(&product(dec!(250)))?;
        store.cart_mut().add(&product(dec!(50)))?;

        let summary = store.checkout();

        store.flush_sync().await;

        assert_eq!(
            summary,
            CheckoutSummary {
                item_count: 2,
                total: dec!(300)
            }
        );
        assert!(store.cart().is_empty());
        assert!(storage.read(&PartitionKey::for_email("a@b.com"))?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn guest_checkout_stays_local() -> TestResult {
        let storage = MemoryStorage::new();
        let mut cart_api = MockCartApi::new();

        cart_api.expect_clear().never();
        cart_api.expect_sync().never();

        let mut store = storefront(
            &storage,
            MockIdentityApi::new(),
            cart_api,
            MockCatalogApi::new(),
        );

        store.cart_mut().add(&product(dec!(40)))?;

        let summary = store.checkout();

        store.flush_sync().await;

        assert_eq!(summary.item_count, 1);
        assert!(store.cart().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn sign_out_reverts_to_guest_cart() -> TestResult {
        let storage = MemoryStorage::new();
        let mut cart_api = MockCartApi::new();

        cart_api.expect_sync().returning(|_, _| Ok(()));

        let mut store = storefront(
            &storage,
            accepting_identity_api(),
            cart_api,
            MockCatalogApi::new(),
        );

        store.login("a@b.com", "hunter22").await?;
        store.cart_mut().add(&product(dec!(99)))?;
        store.sign_out()?;
        store.flush_sync().await;

        assert_eq!(store.session().state(), SessionState::Anonymous);
        assert_eq!(store.cart().partition(), &PartitionKey::Guest);
        assert!(store.cart().is_empty());
        assert!(store.token().is_none());
        assert!(storage.read(&PartitionKey::for_email("a@b.com"))?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn stock_levels_cover_cart_lines() -> TestResult {
        let storage = MemoryStorage::new();
        let cpu = product(dec!(300));
        let cpu_id = cpu.id.clone();
        let mut catalog_api = MockCatalogApi::new();

        catalog_api
            .expect_stock_levels()
            .once()
            .withf({
                let cpu_id = cpu_id.clone();
                move |products| products == &vec![cpu_id.clone()]
            })
            .return_once({
                let cpu_id = cpu_id.clone();
                move |_| {
                    Ok(vec![StockLevel {
                        product_id: cpu_id,
                        stock: 3,
                    }])
                }
            });

        let mut store = storefront(
            &storage,
            MockIdentityApi::new(),
            MockCartApi::new(),
            catalog_api,
        );

        store.cart_mut().add(&cpu)?;

        let levels = store.stock_levels().await?;

        assert_eq!(levels.get(&cpu_id), Some(&3));

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_skips_stock_lookup() -> TestResult {
        let storage = MemoryStorage::new();
        let mut catalog_api = MockCatalogApi::new();

        catalog_api.expect_stock_levels().never();

        let store = storefront(
            &storage,
            MockIdentityApi::new(),
            MockCartApi::new(),
            catalog_api,
        );

        assert!(store.stock_levels().await?.is_empty());

        Ok(())
    }

    #[test]
    fn sync_skips_lines_without_catalog_ids() {
        let line = CartLine::from_product(&ProductSnapshot {
            id: ProductId::new("legacy-sku"),
            name: "Fan".to_string(),
            price: dec!(10),
            discount_price: None,
            image_url: None,
        });

        assert!(sync_items(&[line]).is_empty());
    }
}
