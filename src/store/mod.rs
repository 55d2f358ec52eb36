//! Local tracked-channel store
//!
//! An ordered set of channel handles per provider, persisted as comma-joined
//! strings behind a small key-value interface. Handles are normalized (leading
//! `@` stripped) before comparison, so the same channel can never appear twice
//! within one provider list. List order is insertion order; it matters only
//! for display.

mod file;

pub use file::FilePersistence;

use anyhow::Result;

const YT_LIST_KEY: &str = "yt_id_list";
const TW_LIST_KEY: &str = "tw_id_list";
const SYNC_KEY_KEY: &str = "sync_key";

/// Channel source supported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Twitch,
}

impl Provider {
    fn list_key(self) -> &'static str {
        match self {
            Provider::YouTube => YT_LIST_KEY,
            Provider::Twitch => TW_LIST_KEY,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Provider::YouTube => "YouTube",
            Provider::Twitch => "Twitch",
        }
    }

    /// Parse a provider tag as entered on the command line
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "yt" | "youtube" => Some(Provider::YouTube),
            "tw" | "twitch" => Some(Provider::Twitch),
            _ => None,
        }
    }
}

/// Normalize a handle for storage and comparison: trim whitespace and strip
/// one leading `@`.
pub fn normalize_handle(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).to_string()
}

/// Minimal key-value persistence interface.
///
/// The production backend is a file in the data directory; tests use an
/// in-memory map. Reads are infallible by design: malformed or missing
/// persisted data degrades to "nothing stored".
pub trait Persistence {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// The tracked-channel store over some persistence backend
pub struct ChannelStore<P: Persistence> {
    backend: P,
}

impl<P: Persistence> ChannelStore<P> {
    pub fn new(backend: P) -> Self {
        Self { backend }
    }

    /// Tracked handles for a provider, in insertion order
    pub fn get(&self, provider: Provider) -> Vec<String> {
        match self.backend.get(provider.list_key()) {
            Some(raw) => raw
                .split(',')
                .map(normalize_handle)
                .filter(|s| !s.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Replace the whole list for a provider
    pub fn set(&mut self, provider: Provider, list: &[String]) -> Result<()> {
        let normalized: Vec<String> = list
            .iter()
            .map(|s| normalize_handle(s))
            .filter(|s| !s.is_empty())
            .collect();
        self.backend.set(provider.list_key(), &normalized.join(","))
    }

    /// Add a handle. Returns false (and stores nothing) when the normalized
    /// handle is already present.
    pub fn add(&mut self, provider: Provider, handle: &str) -> Result<bool> {
        let handle = normalize_handle(handle);
        if handle.is_empty() {
            return Ok(false);
        }

        let mut list = self.get(provider);
        if list.iter().any(|h| *h == handle) {
            return Ok(false);
        }

        list.push(handle);
        self.set(provider, &list)?;
        Ok(true)
    }

    /// Remove a handle by exact normalized match. Returns false when the
    /// handle was not tracked.
    pub fn remove(&mut self, provider: Provider, handle: &str) -> Result<bool> {
        let handle = normalize_handle(handle);
        let list = self.get(provider);
        let filtered: Vec<String> = list.iter().filter(|h| **h != handle).cloned().collect();

        if filtered.len() == list.len() {
            return Ok(false);
        }

        self.set(provider, &filtered)?;
        Ok(true)
    }

    /// The persisted sync key, if any
    pub fn sync_key(&self) -> Option<String> {
        self.backend
            .get(SYNC_KEY_KEY)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn set_sync_key(&mut self, key: &str) -> Result<()> {
        self.backend.set(SYNC_KEY_KEY, key.trim())
    }
}

/// In-memory persistence backend for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryPersistence {
    values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl Persistence for MemoryPersistence {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
