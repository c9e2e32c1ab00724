use std::fmt;

use sha2::{Digest, Sha256};

use crate::app::{FullfeedError, Result};
use crate::domain::FeedItem;

const STORAGE_KEY_PREFIX: &str = "fullfeed:item:";

/// Cache key of an item: its guid, else its link, else its title.
///
/// Values are taken verbatim. Two links that differ only by a trailing
/// slash or by query parameter order are different identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemIdentity(String);

impl ItemIdentity {
    /// Resolve the identity of an item. Empty fields count as absent.
    pub fn resolve(item: &FeedItem) -> Result<Self> {
        [&item.guid, &item.link, &item.title]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .map(|value| Self(value.clone()))
            .ok_or(FullfeedError::InvalidItem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bounded-length key used by the persistent cache backends
    pub fn storage_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        format!("{}{}", STORAGE_KEY_PREFIX, hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
