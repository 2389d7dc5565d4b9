//! In-memory session store.
//!
//! Sessions live until their TTL passes or until newer insertions push them
//! out of the bounded capacity (oldest inserted first, not least recently
//! read). Expired entries are removed on every read and by an optional
//! background sweeper.

mod config;
mod sweeper;

pub use config::{
    StoreConfig, DEFAULT_MAX_SESSIONS, DEFAULT_SWEEP_INTERVAL_SECONDS, DEFAULT_TTL_SECONDS,
};
pub use sweeper::SweeperHandle;

use indexmap::IndexMap;
use playback_core::Session;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Deadline used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Receipt returned by [`SessionStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub id: String,
    pub ttl: Duration,
}

#[derive(Debug)]
struct Entry {
    session: Session,
    expires_at: Instant,
}

#[derive(Debug)]
pub(crate) struct Shared {
    config: StoreConfig,
    /// Insertion-ordered, so the front is always the oldest entry.
    entries: Mutex<IndexMap<String, Entry>>,
}

impl Shared {
    fn entries(&self) -> MutexGuard<'_, IndexMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn sweep(&self) -> usize {
        sweep_expired(&mut self.entries(), Instant::now())
    }
}

fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

fn sweep_expired(entries: &mut IndexMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.expires_at > now);
    before - entries.len()
}

/// Shared handle to the session cache. Cloning is cheap; clones see the same entries.
#[derive(Debug, Clone)]
pub struct SessionStore {
    shared: Arc<Shared>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl SessionStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                entries: Mutex::new(IndexMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    /// Store a session under a fresh id, evicting the oldest entries if the
    /// store is over capacity afterwards.
    pub fn put(&self, mut session: Session) -> Stored {
        let id = Uuid::new_v4().to_string();
        let ttl = self.shared.config.ttl;
        session.id = Some(id.clone());

        let mut entries = self.shared.entries();
        entries.insert(
            id.clone(),
            Entry {
                session,
                expires_at: deadline(Instant::now(), ttl),
            },
        );

        let max = self.shared.config.max_sessions;
        let overflow = entries.len().saturating_sub(max);
        if overflow > 0 {
            entries.drain(..overflow);
            tracing::debug!(evicted = overflow, max, "session store over capacity");
        }

        Stored { id, ttl }
    }

    /// Look up a live session. Expired entries are swept first, so an entry
    /// whose TTL has just passed is reported as absent.
    pub fn get(&self, id: &str) -> Option<Session> {
        let mut entries = self.shared.entries();
        sweep_expired(&mut entries, Instant::now());
        entries.get(id).map(|entry| entry.session.clone())
    }

    /// Set `meta[key]` on a live session. Returns `false` if the session is
    /// gone (expired, evicted or never stored).
    pub fn annotate(&self, id: &str, key: &str, value: serde_json::Value) -> bool {
        let mut entries = self.shared.entries();
        match entries.get_mut(id) {
            Some(entry) if entry.expires_at > Instant::now() => {
                entry.session.meta.insert(key.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Remove every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }

    /// Number of entries currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.shared.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start the periodic expiry sweep on the current tokio runtime.
    ///
    /// The task only holds a weak reference, so it ends on its own once every
    /// store handle is dropped.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        sweeper::spawn(Arc::downgrade(&self.shared), self.shared.config.sweep_interval)
    }
}
