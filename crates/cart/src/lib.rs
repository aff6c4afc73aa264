//! Rigforge Cart
//!
//! Client-side cart state for the Rigforge storefront: partitioned carts persisted to a local
//! store, merged into the signed-in user's cart on login and synchronised to the server on a
//! best-effort basis.

pub mod identity;
pub mod lines;
pub mod manager;
pub mod merge;
pub mod partition;
pub mod remote;
pub mod session;
pub mod storage;
pub mod storefront;

pub use identity::{Identity, Role};
pub use lines::{CartLine, CartSnapshot, ProductId, ProductSnapshot};
pub use manager::{CartChanges, CartError, CartManager};
pub use partition::PartitionKey;
pub use remote::{
    AuthToken, CartApi, CatalogApi, HttpStorefrontClient, IdentityApi, RemoteError, StockLevel,
    StorefrontClientConfig, SyncItem,
};
pub use session::{Session, SessionError, SessionState};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use storefront::{CheckoutSummary, Storefront, StorefrontError};
