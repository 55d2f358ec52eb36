//! Cross-device sync of the tracked-channel lists
//!
//! The backend hands out opaque keys; pushing stores both channel lists
//! under a key, pulling retrieves them. Pull merges additively into the
//! local store (never replaces), so pulling a shared list onto an existing
//! one keeps prior subscriptions and is idempotent. A key that fails the
//! local format check never reaches the network.

use anyhow::{bail, Result};
use std::fmt;
use tracing::{debug, info};

use crate::api::{ApiClient, SyncPullResponse};
use crate::error::WatchError;
use crate::store::{ChannelStore, Persistence, Provider};

const KEY_GROUP_LENGTHS: [usize; 5] = [8, 4, 4, 4, 12];

/// An opaque sync key that has passed the format check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncKey(String);

impl SyncKey {
    /// Validate the 8-4-4-4-12 word-character group format
    pub fn parse(raw: &str) -> Result<Self, WatchError> {
        if verify_sync_key(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(WatchError::InvalidKey)
        }
    }

    /// Wrap a key the backend just generated. Backend keys are trusted as
    /// valid without re-checking.
    fn from_backend(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check the sync key format: five dash-separated groups of 8-4-4-4-12
/// ASCII word characters, case-insensitive.
pub fn verify_sync_key(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    if groups.len() != KEY_GROUP_LENGTHS.len() {
        return false;
    }

    groups.iter().zip(KEY_GROUP_LENGTHS).all(|(group, len)| {
        group.len() == len
            && group
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Client for the sync endpoints, operating on the local channel store
pub struct SyncClient<'a> {
    api: &'a ApiClient,
}

impl<'a> SyncClient<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Request a fresh key from the backend
    pub async fn generate(&self) -> Result<SyncKey> {
        let key = self.api.sync_new().await?;
        info!("Generated sync key {}", key);
        Ok(SyncKey::from_backend(key))
    }

    /// Push both local lists to the backend under `key`, overwriting the
    /// server-side state. The backend owns persistence and conflict
    /// resolution; no merge happens on push.
    pub async fn push<P: Persistence>(
        &self,
        key: &str,
        store: &ChannelStore<P>,
    ) -> Result<SyncKey> {
        let key = SyncKey::parse(key)?;
        let yt_list = store.get(Provider::YouTube);
        let tw_list = store.get(Provider::Twitch);

        let ack = self.api.sync_push(key.as_str(), &yt_list, &tw_list).await?;
        if !ack.is_ok() {
            bail!("sync push rejected by backend: {}", ack.result);
        }

        info!(
            "Pushed {} YouTube / {} Twitch channels to key {}",
            yt_list.len(),
            tw_list.len(),
            key
        );
        Ok(key)
    }

    /// Pull the lists stored under `key` and merge them into the local
    /// store. Returns how many channels were newly added.
    pub async fn pull<P: Persistence>(
        &self,
        key: &str,
        store: &mut ChannelStore<P>,
    ) -> Result<usize> {
        let key = SyncKey::parse(key)?;
        let pulled = self.api.sync_pull(key.as_str()).await?;
        debug!(
            "Pulled {} YouTube / {} Twitch channels from key {}",
            pulled.yt_ch.len(),
            pulled.tw_ch.len(),
            key
        );
        merge_pulled(store, &pulled)
    }
}

/// Merge pulled lists into the store via `add` (not `set`): existing local
/// order is preserved and only unseen handles are appended.
pub fn merge_pulled<P: Persistence>(
    store: &mut ChannelStore<P>,
    pulled: &SyncPullResponse,
) -> Result<usize> {
    let mut added = 0;
    for handle in &pulled.yt_ch {
        if store.add(Provider::YouTube, handle)? {
            added += 1;
        }
    }
    for handle in &pulled.tw_ch {
        if store.add(Provider::Twitch, handle)? {
            added += 1;
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPersistence;

    #[test]
    fn accepts_uuid_shaped_keys() {
        assert!(verify_sync_key("01234567-89ab-cdef-0123-456789abcdef"));
        assert!(verify_sync_key("ABCDEF01-2345-6789-ABCD-EF0123456789"));
        // The backend alphabet is word characters, not strict hex
        assert!(verify_sync_key("abcd_fgh-ij_l-mnop-qrst-uvwxyz012345"));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!verify_sync_key(""));
        assert!(!verify_sync_key("not-a-key"));
        assert!(!verify_sync_key("01234567-89ab-cdef-0123-456789abcde"));
        assert!(!verify_sync_key("01234567-89ab-cdef-0123-456789abcdef0"));
        assert!(!verify_sync_key("01234567089ab0cdef001230456789abcdef"));
        assert!(!verify_sync_key("0123456û-89ab-cdef-0123-456789abcdef"));
        assert!(!verify_sync_key("01234567-89ab-cdef-0123-456789abcdef-"));
    }

    #[test]
    fn parse_fails_fast_with_invalid_key() {
        assert!(matches!(
            SyncKey::parse("bogus"),
            Err(WatchError::InvalidKey)
        ));
    }

    #[test]
    fn merge_keeps_local_order_and_appends_new() {
        let mut store = ChannelStore::new(MemoryPersistence::default());
        store.add(Provider::YouTube, "local1").unwrap();
        store.add(Provider::YouTube, "shared").unwrap();

        let pulled = SyncPullResponse {
            yt_ch: vec!["shared".to_string(), "remote1".to_string()],
            tw_ch: vec!["tw_remote".to_string()],
        };

        let added = merge_pulled(&mut store, &pulled).unwrap();
        assert_eq!(added, 2);
        assert_eq!(
            store.get(Provider::YouTube),
            vec!["local1", "shared", "remote1"]
        );
        assert_eq!(store.get(Provider::Twitch), vec!["tw_remote"]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut store = ChannelStore::new(MemoryPersistence::default());
        let pulled = SyncPullResponse {
            yt_ch: vec!["a".to_string(), "b".to_string()],
            tw_ch: vec![],
        };

        assert_eq!(merge_pulled(&mut store, &pulled).unwrap(), 2);
        assert_eq!(merge_pulled(&mut store, &pulled).unwrap(), 0);
        assert_eq!(store.get(Provider::YouTube), vec!["a", "b"]);
    }
}
