//! Partition Keys

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::identity::Identity;

const GUEST_KEY: &str = "guest";
const USER_KEY_PREFIX: &str = "user:";

/// Key separating one cart's persisted record from another's.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartitionKey {
    /// Cart of an anonymous session.
    Guest,

    /// Cart of a signed-in user, keyed by normalised email.
    User(String),
}

impl PartitionKey {
    /// Derive the key for the current identity, `Guest` when nobody is signed in.
    #[must_use]
    pub fn for_identity(identity: Option<&Identity>) -> Self {
        identity.map_or(Self::Guest, |identity| Self::for_email(&identity.email))
    }

    /// Derive the user key for the given email address.
    #[must_use]
    pub fn for_email(email: &str) -> Self {
        Self::User(email.trim().to_lowercase())
    }

    /// Storage key of this partition.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Guest => GUEST_KEY.to_string(),
            Self::User(email) => format!("{USER_KEY_PREFIX}{email}"),
        }
    }

    /// Parse a storage key back into a partition key.
    #[must_use]
    pub fn from_storage_key(key: &str) -> Option<Self> {
        if key == GUEST_KEY {
            return Some(Self::Guest);
        }

        key.strip_prefix(USER_KEY_PREFIX)
            .filter(|email| !email.is_empty())
            .map(|email| Self::User(email.to_string()))
    }

    /// Whether this is the guest partition.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl Display for PartitionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.storage_key())
    }
}
