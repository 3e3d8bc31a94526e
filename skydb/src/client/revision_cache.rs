// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! Last known revision of every entry this client touched.
//!
//! Each entry carries an async lock held across the whole revision assignment
//! of a write (fetch, sign, post). Two overlapping writes on the same client
//! therefore either serialize or the late one fails with a concurrent access
//! error instead of reusing a revision.

use sky_protocol::constants::MAX_WRITABLE_REVISION;
use sky_protocol::{DataKey, PublicKey};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevisionError {
    #[error("Concurrent access prevented on entry {key}: its revision changed while this operation was running")]
    ConcurrentAccess { key: String },
    #[error("Entry {key} reached the maximum revision {max}")]
    Overflow { key: String, max: u64 },
}

/// Per client cache, keyed by `owner public key hex:hashed data key hex`.
#[derive(Debug, Default)]
pub struct RevisionCache {
    // Held only while looking an entry up or inserting it.
    entries: Mutex<HashMap<String, Arc<CachedRevisionEntry>>>,
}

impl RevisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cache entry of (owner, data key), creating an unresolved one
    /// on first access. Concurrent callers always get the same entry.
    pub async fn get_or_create(
        &self,
        owner: &PublicKey,
        data_key: &DataKey,
    ) -> Arc<CachedRevisionEntry> {
        let key = cache_key(owner, data_key);
        let mut entries = self.entries.lock().await;
        Arc::clone(entries.entry(key.clone()).or_insert_with(|| {
            trace!("Creating revision cache entry for {key}");
            Arc::new(CachedRevisionEntry::new(key))
        }))
    }

    /// The last known revision of (owner, data key), `None` when unknown.
    pub async fn revision(&self, owner: &PublicKey, data_key: &DataKey) -> Option<u64> {
        let entries = self.entries.lock().await;
        entries
            .get(&cache_key(owner, data_key))
            .and_then(|entry| entry.revision())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

fn cache_key(owner: &PublicKey, data_key: &DataKey) -> String {
    format!("{}:{}", owner.to_hex(), data_key.to_hex())
}

#[derive(Debug)]
pub struct CachedRevisionEntry {
    key: String,
    // `None` until the revision has been fetched or written.
    revision: RwLock<Option<u64>>,
    lock: Mutex<()>,
}

impl CachedRevisionEntry {
    fn new(key: String) -> Self {
        Self {
            key,
            revision: RwLock::new(None),
            lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The last known revision. Reading it does not wait for a write in progress.
    pub fn revision(&self) -> Option<u64> {
        *self
            .revision
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a revision fetched from the registry.
    ///
    /// The cache never moves backwards: a fetch older than what this client
    /// already knows is stale and leaves the cache untouched. Returns whether
    /// the fetched revision was taken.
    pub fn observe(&self, fetched: Option<u64>) -> bool {
        let mut revision = self
            .revision
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match (*revision, fetched) {
            (_, None) => false,
            (Some(cached), Some(fetched)) if fetched < cached => {
                debug!(
                    "Ignoring stale revision {fetched} of {}, cached revision is {cached}",
                    self.key
                );
                false
            }
            (_, Some(fetched)) => {
                *revision = Some(fetched);
                true
            }
        }
    }

    /// Waits for the write lock of this entry.
    pub async fn lock(&self) -> RevisionGuard<'_> {
        let guard = self.lock.lock().await;
        RevisionGuard {
            entry: self,
            _guard: guard,
        }
    }

    fn set(&self, value: Option<u64>) {
        *self
            .revision
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }
}

/// Exclusive right to assign the next revision of an entry.
pub struct RevisionGuard<'a> {
    entry: &'a CachedRevisionEntry,
    _guard: MutexGuard<'a, ()>,
}

impl RevisionGuard<'_> {
    pub fn cached(&self) -> Option<u64> {
        self.entry.revision()
    }

    /// Decides the revision of the next write.
    ///
    /// `proposed` is the revision derived from a registry fetch made before the
    /// lock was taken, `None` when no fetch was needed. A proposal must be
    /// exactly the cached revision plus one, anything else means another
    /// operation on this client moved the entry in the meantime. Without a
    /// proposal the cached revision must be known. The cache is left untouched.
    pub fn next_revision(&self, proposed: Option<u64>) -> Result<u64, RevisionError> {
        let next = match (self.cached(), proposed) {
            (Some(cached), proposed) => {
                let expected = cached
                    .checked_add(1)
                    .filter(|next| *next <= MAX_WRITABLE_REVISION)
                    .ok_or_else(|| self.overflow())?;
                if proposed.is_some_and(|proposed| proposed != expected) {
                    return Err(self.concurrent_access());
                }
                expected
            }
            (None, Some(proposed)) => proposed,
            (None, None) => return Err(self.concurrent_access()),
        };
        if next > MAX_WRITABLE_REVISION {
            return Err(self.overflow());
        }
        Ok(next)
    }

    /// Records a revision accepted by the registry.
    pub fn commit(&self, revision: u64) {
        trace!("Revision of {} is now {revision}", self.entry.key);
        self.entry.set(Some(revision));
    }

    /// Forgets the cached revision, the next write fetches it again.
    pub fn invalidate(&self) {
        debug!("Invalidating cached revision of {}", self.entry.key);
        self.entry.set(None);
    }

    fn concurrent_access(&self) -> RevisionError {
        warn!("Concurrent access prevented on entry {}", self.entry.key);
        RevisionError::ConcurrentAccess {
            key: self.entry.key.clone(),
        }
    }

    fn overflow(&self) -> RevisionError {
        RevisionError::Overflow {
            key: self.entry.key.clone(),
            max: MAX_WRITABLE_REVISION,
        }
    }
}
