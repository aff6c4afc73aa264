//! Cart state manager.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    identity::Identity,
    lines::{self, CartLine, CartSnapshot, ProductId, ProductSnapshot},
    merge::merge_carts,
    partition::PartitionKey,
    session::SessionState,
    storage::{CartStorage, StorageError},
};

/// Errors returned by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No line exists for the given product.
    #[error("no cart line for product {0}")]
    LineNotFound(ProductId),

    /// Quantities must be positive integers.
    #[error("quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    /// The in-memory change was applied but could not be persisted.
    #[error("failed to persist cart")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded for storage.
    #[error("failed to encode cart")]
    Encode(#[from] serde_json::Error),
}

/// Receiver of cart change notifications.
///
/// Only the latest state is retained: a burst of mutations may be observed as a single change.
#[derive(Debug, Clone)]
pub struct CartChanges {
    receiver: watch::Receiver<CartSnapshot>,
}

impl CartChanges {
    /// Latest published snapshot.
    #[must_use]
    pub fn latest(&self) -> CartSnapshot {
        self.receiver.borrow().clone()
    }

    /// Whether a snapshot was published since the last call to [`CartChanges::changed`].
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next change, returning `None` once the manager is dropped.
    pub async fn changed(&mut self) -> Option<CartSnapshot> {
        self.receiver.changed().await.ok()?;

        Some(self.receiver.borrow_and_update().clone())
    }
}

/// Owner of the active cart.
///
/// The in-memory lines are the source of truth for the session; every mutation is followed by a
/// best-effort write of the full cart to storage. A failed write is logged and reported but never
/// rolled back, and the next successful mutation persists the full state again.
pub struct CartManager {
    storage: Arc<dyn CartStorage>,
    session: watch::Receiver<SessionState>,
    partition: PartitionKey,
    lines: Vec<CartLine>,
    loading: bool,
    changes: watch::Sender<CartSnapshot>,
}

impl Debug for CartManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartManager")
            .field("partition", &self.partition)
            .field("lines", &self.lines)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Create a manager and load the cart of the session's current identity.
    pub fn new(storage: Arc<dyn CartStorage>, session: watch::Receiver<SessionState>) -> Self {
        let partition = PartitionKey::for_identity(session.borrow().identity());

        let mut manager = Self {
            storage,
            session,
            partition,
            lines: Vec::new(),
            loading: false,
            changes: watch::Sender::new(CartSnapshot::default()),
        };

        manager.load();

        manager
    }

    /// Re-derive the partition from the current identity and read its persisted lines.
    ///
    /// Unreadable or corrupt records load as an empty cart.
    pub fn load(&mut self) {
        self.loading = true;
        self.partition = PartitionKey::for_identity(self.session.borrow_and_update().identity());
        self.lines = self.read_lines(&self.partition);
        self.loading = false;

        debug!(partition = %self.partition, lines = self.lines.len(), "loaded cart");

        self.publish();
    }

    /// Reload when the session identity no longer matches the active partition.
    ///
    /// Returns `true` when the cart was reloaded.
    pub fn refresh_identity(&mut self) -> bool {
        let current = PartitionKey::for_identity(self.session.borrow().identity());

        if current == self.partition {
            return false;
        }

        self.load();

        true
    }

    /// Re-read the active cart after another instance changed the given partition.
    ///
    /// Returns `true` when the signal concerned the active partition.
    pub fn handle_storage_change(&mut self, key: &PartitionKey) -> bool {
        if *key != self.partition {
            return false;
        }

        self.lines = self.read_lines(&self.partition);
        self.publish();

        true
    }

    /// Signals emitted when any instance sharing the storage writes a partition.
    #[must_use]
    pub fn storage_changes(&self) -> broadcast::Receiver<PartitionKey> {
        self.storage.subscribe()
    }

    /// Add one unit of a product, creating its line if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the cart could not be persisted; the in-memory cart
    /// still holds the addition.
    pub fn add(&mut self, product: &ProductSnapshot) -> Result<(), CartError> {
        match self.line_mut(&product.id) {
            Ok(line) => line.quantity = line.quantity.saturating_add(1),
            Err(_missing) => self.lines.push(CartLine::from_product(product)),
        }

        self.commit()
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown line, or [`CartError::Storage`] when
    /// the change could not be persisted.
    pub fn increase(&mut self, product: &ProductId) -> Result<(), CartError> {
        let line = self.line_mut(product)?;

        line.quantity = line.quantity.saturating_add(1);

        self.commit()
    }

    /// Remove one unit from an existing line. A line at quantity 1 is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown line, or [`CartError::Storage`] when
    /// the change could not be persisted.
    pub fn decrease(&mut self, product: &ProductId) -> Result<(), CartError> {
        let line = self.line_mut(product)?;

        if line.quantity <= 1 {
            return Ok(());
        }

        line.quantity -= 1;

        self.commit()
    }

    /// Set the quantity of an existing line.
    ///
    /// Stock clamping is the caller's concern and must happen before this call.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` is not a positive integer,
    /// [`CartError::LineNotFound`] for an unknown line, or [`CartError::Storage`] when the change
    /// could not be persisted.
    pub fn set_quantity(&mut self, product: &ProductId, quantity: i64) -> Result<(), CartError> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(CartError::InvalidQuantity(quantity))?;

        self.line_mut(product)?.quantity = quantity;

        self.commit()
    }

    /// Delete a line entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] for an unknown line, or [`CartError::Storage`] when
    /// the change could not be persisted.
    pub fn remove(&mut self, product: &ProductId) -> Result<(), CartError> {
        let before = self.lines.len();

        self.lines.retain(|line| line.product_id != *product);

        if self.lines.len() == before {
            return Err(CartError::LineNotFound(product.clone()));
        }

        self.commit()
    }

    /// Empty the active cart and remove its persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the record could not be removed.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.lines.clear();
        self.publish();

        self.storage.remove(&self.partition).map_err(|error| {
            warn!(partition = %self.partition, "failed to remove cart record: {error}");

            CartError::from(error)
        })
    }

    /// Fold the guest cart into the given identity's cart and make it the active partition.
    ///
    /// Quantities of shared products are added, other guest lines are appended. The merged cart
    /// is written to the user partition and the guest record is cleared afterwards. With an empty
    /// guest cart this only switches to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the merged cart could not be written (the guest record
    /// is then kept) or the guest record could not be cleared.
    pub fn merge_on_authenticate(&mut self, identity: &Identity) -> Result<(), CartError> {
        let user_partition = PartitionKey::for_identity(Some(identity));

        let guest = if self.partition.is_guest() {
            std::mem::take(&mut self.lines)
        } else {
            self.read_lines(&PartitionKey::Guest)
        };

        let user = self.read_lines(&user_partition);

        self.partition = user_partition;

        if guest.is_empty() {
            self.lines = user;
            self.publish();

            return Ok(());
        }

        let guest_lines = guest.len();

        self.lines = merge_carts(user, guest);

        info!(
            partition = %self.partition,
            guest_lines,
            lines = self.lines.len(),
            "merged guest cart"
        );

        self.commit()?;

        self.storage.remove(&PartitionKey::Guest).map_err(|error| {
            warn!("failed to clear guest cart after merge: {error}");

            CartError::from(error)
        })
    }

    /// Sum of `unit_price * quantity` over the current lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        lines::total(&self.lines)
    }

    /// Number of units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        lines::item_count(&self.lines)
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for the given product, if present.
    #[must_use]
    pub fn line(&self, product: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == *product)
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Active partition.
    #[must_use]
    pub fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    /// Whether a load is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_lines(&self.lines)
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> CartChanges {
        CartChanges {
            receiver: self.changes.subscribe(),
        }
    }

    /// Invoke `callback` with the latest snapshot after each observed change.
    ///
    /// The callback runs on a spawned task until the manager is dropped. Must be called from
    /// within a Tokio runtime.
    pub fn on_cart_changed<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(&CartSnapshot) + Send + 'static,
    {
        let mut changes = self.subscribe();

        tokio::spawn(async move {
            while let Some(snapshot) = changes.changed().await {
                callback(&snapshot);
            }
        })
    }

    fn line_mut(&mut self, product: &ProductId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == *product)
            .ok_or_else(|| CartError::LineNotFound(product.clone()))
    }

    fn read_lines(&self, partition: &PartitionKey) -> Vec<CartLine> {
        let record = match self.storage.read(partition) {
            Ok(Some(record)) => record,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!(partition = %partition, "failed to read cart record: {error}");

                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<CartLine>>(&record) {
            // Records written by other instances are folded so each product has one line.
            Ok(lines) => merge_carts(
                Vec::new(),
                lines.into_iter().filter(|line| line.quantity > 0).collect(),
            ),
            Err(error) => {
                warn!(partition = %partition, "discarding unreadable cart record: {error}");

                Vec::new()
            }
        }
    }

    fn commit(&mut self) -> Result<(), CartError> {
        self.publish();
        self.persist()
    }

    fn persist(&self) -> Result<(), CartError> {
        let record = serde_json::to_string(&self.lines)?;

        self.storage.write(&self.partition, &record).map_err(|error| {
            warn!(partition = %self.partition, "failed to persist cart: {error}");

            CartError::from(error)
        })
    }

    fn publish(&self) {
        self.changes
            .send_replace(CartSnapshot::from_lines(&self.lines));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use rust_decimal_macros::dec;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        identity::Role,
        session::Session,
        storage::{MemoryStorage, MockCartStorage},
    };

    use super::*;

    fn product(id: &str, price: Decimal, discount_price: Option<Decimal>) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            price,
            discount_price,
            image_url: Some(format!("https://img.example.com/{id}.png")),
        }
    }

    fn identity(email: &str) -> Identity {
        Identity {
            id: Uuid::now_v7(),
            name: "Ada".to_string(),
            email: email.to_string(),
            role: Role::Customer,
        }
    }

    fn guest_manager(storage: &MemoryStorage) -> (Session, CartManager) {
        let session = Session::new();
        let manager = CartManager::new(Arc::new(storage.clone()), session.subscribe());

        (session, manager)
    }

    fn quantity(manager: &CartManager, id: &str) -> Option<u32> {
        manager
            .line(&ProductId::new(id))
            .map(|line| line.quantity)
    }

    #[test]
    fn repeated_adds_keep_a_single_line() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);
        let gpu = product("gpu-1", dec!(500), None);

        for _ in 0..5 {
            cart.add(&gpu)?;
        }

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(quantity(&cart, "gpu-1"), Some(5));

        Ok(())
    }

    #[test]
    fn add_snapshots_discount_price() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);

        cart.add(&product("cpu-1", dec!(300), Some(dec!(250))))?;

        let line = cart.line(&ProductId::new("cpu-1")).ok_or("missing line")?;

        assert_eq!(line.unit_price, dec!(250));
        assert_eq!(line.list_price, dec!(300));
        assert_eq!(cart.total(), dec!(250));

        Ok(())
    }

    #[test]
    fn total_tracks_every_mutation() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);

        cart.add(&product("gpu-1", dec!(499.99), None))?;
        cart.add(&product("ram-1", dec!(80), Some(dec!(75.50))))?;
        assert_eq!(cart.total(), dec!(575.49));

        cart.increase(&ProductId::new("ram-1"))?;
        assert_eq!(cart.total(), dec!(650.99));

        cart.set_quantity(&ProductId::new("gpu-1"), 3)?;
        assert_eq!(cart.total(), dec!(1650.97));

        cart.remove(&ProductId::new("gpu-1"))?;
        assert_eq!(cart.total(), dec!(151.00));

        cart.clear()?;
        assert_eq!(cart.total(), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn decrease_stops_at_one() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);
        let ssd = ProductId::new("ssd-1");

        cart.add(&product("ssd-1", dec!(120), None))?;
        cart.increase(&ssd)?;

        cart.decrease(&ssd)?;
        cart.decrease(&ssd)?;
        cart.decrease(&ssd)?;

        assert_eq!(quantity(&cart, "ssd-1"), Some(1));

        Ok(())
    }

    #[test]
    fn set_quantity_rejects_non_positive_values() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);
        let ssd = ProductId::new("ssd-1");

        cart.add(&product("ssd-1", dec!(120), None))?;
        cart.set_quantity(&ssd, 4)?;

        for invalid in [0, -1, -40, i64::from(u32::MAX) + 1] {
            let result = cart.set_quantity(&ssd, invalid);

            assert!(
                matches!(result, Err(CartError::InvalidQuantity(n)) if n == invalid),
                "expected InvalidQuantity for {invalid}, got {result:?}"
            );
        }

        assert_eq!(quantity(&cart, "ssd-1"), Some(4));

        Ok(())
    }

    #[test]
    fn increase_unknown_line_fails_without_creating_one() {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);

        let result = cart.increase(&ProductId::new("missing-line-id"));

        assert!(
            matches!(result, Err(CartError::LineNotFound(_))),
            "expected LineNotFound, got {result:?}"
        );
        assert!(cart.is_empty());
        assert!(storage.keys().is_empty(), "nothing should be persisted");
    }

    #[test]
    fn remove_unknown_line_fails() {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);

        assert!(cart.remove(&ProductId::new("nope")).is_err());
    }

    #[test]
    fn clear_is_idempotent() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);

        cart.add(&product("gpu-1", dec!(500), None))?;

        cart.clear()?;
        assert!(cart.is_empty());
        assert!(storage.read(&PartitionKey::Guest)?.is_none());

        cart.clear()?;
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn mutations_are_persisted_and_reloaded() -> TestResult {
        let storage = MemoryStorage::new();

        {
            let (_session, mut cart) = guest_manager(&storage);

            cart.add(&product("gpu-1", dec!(500), None))?;
            cart.add(&product("gpu-1", dec!(500), None))?;
        }

        let (_session, cart) = guest_manager(&storage);

        assert_eq!(quantity(&cart, "gpu-1"), Some(2));

        Ok(())
    }

    #[test]
    fn corrupt_record_loads_empty() -> TestResult {
        let storage = MemoryStorage::new();

        storage.write(&PartitionKey::Guest, "{not json")?;

        let (_session, cart) = guest_manager(&storage);

        assert!(cart.is_empty());
        assert!(!cart.is_loading());

        Ok(())
    }

    #[test]
    fn duplicate_lines_in_storage_are_folded() -> TestResult {
        let storage = MemoryStorage::new();
        let line = CartLine::from_product(&product("ram-1", dec!(80), None));

        storage.write(
            &PartitionKey::Guest,
            &serde_json::to_string(&[line.clone(), line])?,
        )?;

        let (_session, cart) = guest_manager(&storage);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(quantity(&cart, "ram-1"), Some(2));

        Ok(())
    }

    #[test]
    fn read_failure_loads_empty() {
        let mut storage = MockCartStorage::new();

        storage
            .expect_read()
            .returning(|_| Err(StorageError::Io(std::io::Error::other("disk gone"))));

        let cart = CartManager::new(Arc::new(storage), Session::new().subscribe());

        assert!(cart.is_empty());
    }

    #[test]
    fn write_failure_keeps_in_memory_change() {
        let mut storage = MockCartStorage::new();

        storage.expect_read().returning(|_| Ok(None));
        storage.expect_write().times(1).returning(|_, _| {
            Err(StorageError::QuotaExceeded {
                needed: 10,
                available: 0,
            })
        });

        let mut cart = CartManager::new(Arc::new(storage), Session::new().subscribe());

        let result = cart.add(&product("gpu-1", dec!(500), None));

        assert!(
            matches!(result, Err(CartError::Storage(_))),
            "expected Storage error, got {result:?}"
        );
        assert_eq!(quantity(&cart, "gpu-1"), Some(1));
        assert_eq!(cart.total(), dec!(500));
    }

    #[test]
    fn merge_into_empty_user_cart() -> TestResult {
        let storage = MemoryStorage::new();
        let (session, mut cart) = guest_manager(&storage);
        let user = identity("a@b.com");

        for _ in 0..2 {
            cart.add(&product("gpu-1", dec!(500), None))?;
        }

        session.begin_authentication()?;
        session.complete_authentication(user.clone())?;
        cart.merge_on_authenticate(&user)?;

        assert_eq!(cart.partition(), &PartitionKey::for_email("a@b.com"));
        assert_eq!(quantity(&cart, "gpu-1"), Some(2));
        assert_eq!(cart.total(), dec!(1000));
        assert!(storage.read(&PartitionKey::Guest)?.is_none());
        assert!(storage.read(&PartitionKey::for_email("a@b.com"))?.is_some());

        Ok(())
    }

    #[test]
    fn merge_adds_quantities_of_shared_products() -> TestResult {
        let storage = MemoryStorage::new();
        let user = identity("a@b.com");

        storage.write(
            &PartitionKey::for_identity(Some(&user)),
            &serde_json::to_string(&[CartLine::from_product(&product("ram-1", dec!(80), None))])?,
        )?;

        let (_session, mut cart) = guest_manager(&storage);

        cart.add(&product("ram-1", dec!(80), None))?;
        cart.add(&product("psu-1", dec!(120), None))?;

        cart.merge_on_authenticate(&user)?;

        assert_eq!(quantity(&cart, "ram-1"), Some(2));
        assert_eq!(quantity(&cart, "psu-1"), Some(1));
        assert_eq!(cart.lines().len(), 2);

        let (_session, guest) = guest_manager(&storage);

        assert!(guest.is_empty(), "guest partition should be cleared");

        Ok(())
    }

    #[test]
    fn merge_with_empty_guest_only_switches_partition() -> TestResult {
        let storage = MemoryStorage::new();
        let user = identity("a@b.com");
        let user_key = PartitionKey::for_identity(Some(&user));

        storage.write(
            &user_key,
            &serde_json::to_string(&[CartLine::from_product(&product("cpu-1", dec!(300), None))])?,
        )?;

        let mut changes = storage.subscribe();
        let (_session, mut cart) = guest_manager(&storage);

        cart.merge_on_authenticate(&user)?;

        assert_eq!(cart.partition(), &user_key);
        assert_eq!(quantity(&cart, "cpu-1"), Some(1));
        assert!(changes.try_recv().is_err(), "no storage writes expected");

        Ok(())
    }

    #[test]
    fn sign_out_reverts_to_guest_and_keeps_user_cart() -> TestResult {
        let storage = MemoryStorage::new();
        let (session, mut cart) = guest_manager(&storage);
        let user = identity("a@b.com");

        session.begin_authentication()?;
        session.complete_authentication(user.clone())?;
        cart.merge_on_authenticate(&user)?;
        cart.add(&product("case-1", dec!(90), None))?;

        session.sign_out()?;

        assert!(cart.refresh_identity());
        assert_eq!(cart.partition(), &PartitionKey::Guest);
        assert!(cart.is_empty());
        assert!(!cart.refresh_identity(), "second refresh is a no-op");

        let persisted = storage
            .read(&PartitionKey::for_email("a@b.com"))?
            .ok_or("user cart should stay persisted")?;

        assert!(persisted.contains("case-1"));

        Ok(())
    }

    #[test]
    fn storage_change_from_other_tab_reloads_active_partition() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session_a, mut tab_a) = guest_manager(&storage);
        let (_session_b, mut tab_b) = guest_manager(&storage);
        let mut signals = tab_b.storage_changes();

        tab_a.add(&product("fan-1", dec!(15), None))?;

        let key = signals.try_recv()?;

        assert!(tab_b.handle_storage_change(&key));
        assert_eq!(quantity(&tab_b, "fan-1"), Some(1));
        assert!(!tab_b.handle_storage_change(&PartitionKey::for_email("x@y.z")));

        Ok(())
    }

    #[test]
    fn subscribers_see_latest_snapshot() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);
        let changes = cart.subscribe();

        cart.add(&product("gpu-1", dec!(500), None))?;
        cart.add(&product("gpu-1", dec!(500), None))?;
        cart.add(&product("fan-1", dec!(15), None))?;

        assert!(changes.has_changed());

        let latest = changes.latest();

        assert_eq!(latest.item_count, 3);
        assert_eq!(latest.total, dec!(1015));

        Ok(())
    }

    #[tokio::test]
    async fn on_cart_changed_invokes_callback() -> TestResult {
        let storage = MemoryStorage::new();
        let (_session, mut cart) = guest_manager(&storage);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut changes = cart.subscribe();
        let handle = cart.on_cart_changed(move |_snapshot| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        tokio::task::yield_now().await;

        cart.add(&product("gpu-1", dec!(500), None))?;

        changes.changed().await.ok_or("manager dropped")?;

        drop(cart);
        handle.await?;

        assert!(calls.load(Ordering::SeqCst) >= 1, "callback should run");

        Ok(())
    }
}
