//! In-memory TTL cache backing the access-token blacklist.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use atelier_auth::TokenCache;

/// Key/value cache whose entries expire after their TTL.
///
/// Expired entries are dropped lazily on `get` and swept on `set`, so the
/// cache never grows past the set of still-live keys plus whatever arrived
/// since the last write.
#[derive(Debug, Default)]
pub struct InMemoryTokenCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_live(expires_at: Instant) -> bool {
        Instant::now() < expires_at
    }
}

impl TokenCache for InMemoryTokenCache {
    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let Ok(mut entries) = self.entries.write() else {
            tracing::error!("token cache lock poisoned on set");
            return;
        };
        entries.retain(|_, (_, expires_at)| Self::is_live(*expires_at));
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
    }

    fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().ok()?;
            match entries.get(key) {
                Some((value, expires_at)) if Self::is_live(*expires_at) => {
                    return Some(value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry exists but has decayed; drop it.
        if let Ok(mut entries) = self.entries.write() {
            if let Some((_, expires_at)) = entries.get(key) {
                if !Self::is_live(*expires_at) {
                    entries.remove(key);
                }
            }
        }
        None
    }
}
