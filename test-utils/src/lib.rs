// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! An in-memory portal for tests.
//!
//! [`MemoryPortal`] keeps registry entries and uploaded content in memory and
//! enforces the rules of a real registry: entries must be signed by their owner,
//! start at revision 0 and only be replaced by a higher revision. Latency and
//! transient failures can be injected, and stored entries can be tampered with.

#[macro_use]
extern crate tracing;

use async_trait::async_trait;
use bytes::Bytes;
use sky_protocol::crypto::hash;
use sky_protocol::registry::{
    decode_entry, RegistryLookupResponse, RegistryPostRequest, RegistryProofHop,
    WireRegistryEntry,
};
use sky_protocol::{DataKey, DataLink, PublicKey};
use skydb::{
    send_with_retries, Client, ClientConfig, ContentService, RegistryLookupRequest,
    RegistryService, RequestOptions, TransportError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Entry links are followed at most this many times per lookup.
pub const MAX_RESOLVED_HOPS: usize = 10;

#[derive(Default)]
struct State {
    entries: HashMap<(PublicKey, String), WireRegistryEntry>,
    content: HashMap<DataLink, Bytes>,
    latency: Option<Duration>,
}

/// A registry and a content store living in memory.
#[derive(Default)]
pub struct MemoryPortal {
    state: Mutex<State>,
    failures_to_inject: AtomicUsize,
    lookups: AtomicUsize,
    posts: AtomicUsize,
    uploads: AtomicUsize,
    downloads: AtomicUsize,
}

impl MemoryPortal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A new client of this portal, with its own revision cache.
    pub fn client(self: &Arc<Self>) -> Client {
        Client::from_portal(Arc::clone(self))
    }

    pub fn client_with_config(self: &Arc<Self>, config: ClientConfig) -> Client {
        Client::from_portal_with_config(Arc::clone(self), config)
    }

    /// Every request waits this long before being served.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state().latency = latency;
    }

    /// The next `count` requests fail with a network error.
    pub fn fail_next_requests(&self, count: usize) {
        self.failures_to_inject.store(count, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn posts(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// The stored entry at (owner, data key) as it would go on the wire.
    pub fn wire_entry(&self, owner: &PublicKey, data_key: &DataKey) -> Option<WireRegistryEntry> {
        self.state()
            .entries
            .get(&(*owner, data_key.to_hex()))
            .cloned()
    }

    /// Stores an entry without any check, e.g. one in a legacy encoding.
    pub fn insert_wire_entry(&self, owner: &PublicKey, entry: WireRegistryEntry) {
        self.state()
            .entries
            .insert((*owner, entry.datakey.clone()), entry);
    }

    /// Replaces the data of a stored entry, leaving its signature as is.
    ///
    /// Returns whether there was an entry to tamper with.
    pub fn tamper_entry_data(&self, owner: &PublicKey, data_key: &DataKey, data: &[u8]) -> bool {
        match self.state().entries.get_mut(&(*owner, data_key.to_hex())) {
            Some(entry) => {
                entry.data = hex::encode(data);
                true
            }
            None => false,
        }
    }

    /// Drops uploaded content, as a portal which lost it would.
    pub fn forget_content(&self, data_link: &DataLink) -> bool {
        self.state().content.remove(data_link).is_some()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn serve(&self, what: &str) -> Result<(), TransportError> {
        let latency = self.state().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let injected = self
            .failures_to_inject
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if injected {
            debug!("Injecting a failure into {what}");
            return Err(TransportError::Network(format!("{what}: injected failure")));
        }
        Ok(())
    }

    async fn lookup(
        &self,
        request: &RegistryLookupRequest,
    ) -> Result<Option<RegistryLookupResponse>, TransportError> {
        self.serve("registry lookup").await?;
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let state = self.state();
        let Some(entry) = state
            .entries
            .get(&(request.publickey, request.datakey.clone()))
        else {
            return Ok(None);
        };
        if !request.resolve_entry_links {
            return Ok(Some(RegistryLookupResponse {
                entry: entry.clone(),
                proof: vec![],
            }));
        }

        let mut proof = vec![RegistryProofHop {
            publickey: request.publickey,
            entry: entry.clone(),
        }];
        while let Some(next) = resolve_entry_link(&state.entries, &proof[proof.len() - 1].entry) {
            if proof.len() > MAX_RESOLVED_HOPS {
                return Err(TransportError::Rejected(
                    "too many entry links to resolve".to_string(),
                ));
            }
            proof.push(next);
        }

        // An entry which is no link is returned without a proof.
        if proof.len() == 1 {
            proof.clear();
        }
        let entry = proof
            .last()
            .map_or_else(|| entry.clone(), |hop| hop.entry.clone());
        Ok(Some(RegistryLookupResponse { entry, proof }))
    }

    async fn store(&self, request: &RegistryPostRequest) -> Result<(), TransportError> {
        self.serve("registry update").await?;
        self.posts.fetch_add(1, Ordering::SeqCst);

        let signed = decode_entry(&request.entry)
            .map_err(|err| TransportError::Rejected(format!("invalid entry: {err}")))?;
        if !signed.verify(&request.publickey) {
            return Err(TransportError::Rejected("invalid signature".to_string()));
        }

        let mut state = self.state();
        let key = (request.publickey, request.entry.datakey.clone());
        if let Some(existing) = state.entries.get(&key) {
            let existing_revision = decode_entry(existing)
                .map(|existing| existing.entry.revision)
                .map_err(|err| TransportError::InvalidResponse(err.to_string()))?;
            if signed.entry.revision <= existing_revision {
                return Err(TransportError::Rejected(format!(
                    "revision {} is not above the stored revision {existing_revision}",
                    signed.entry.revision
                )));
            }
        } else if signed.entry.revision != 0 {
            return Err(TransportError::Rejected(format!(
                "a new entry must start at revision 0, got {}",
                signed.entry.revision
            )));
        }
        state.entries.insert(key, request.entry.clone());
        Ok(())
    }

    async fn put_content(&self, data: Bytes) -> Result<String, TransportError> {
        self.serve("upload").await?;
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let data_link = DataLink::new_v1(hash(&data));
        self.state().content.insert(data_link, data);
        Ok(data_link.to_string())
    }

    async fn get_content(&self, data_link: &DataLink) -> Result<Option<Bytes>, TransportError> {
        self.serve("download").await?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.state().content.get(data_link).cloned())
    }
}

/// The entry the data of `entry` links to, if it is an entry link to a stored entry.
fn resolve_entry_link(
    entries: &HashMap<(PublicKey, String), WireRegistryEntry>,
    entry: &WireRegistryEntry,
) -> Option<RegistryProofHop> {
    let data = decode_entry(entry).ok()?.entry.data;
    let link = DataLink::from_bytes(&data).ok().filter(DataLink::is_v2)?;
    entries.iter().find_map(|((owner, datakey), candidate)| {
        let data_key = DataKey::new(datakey, true).ok()?;
        (DataLink::entry_link(owner, &data_key) == link).then(|| RegistryProofHop {
            publickey: *owner,
            entry: candidate.clone(),
        })
    })
}

#[async_trait]
impl RegistryService for MemoryPortal {
    async fn get_entry(
        &self,
        request: &RegistryLookupRequest,
        opts: &RequestOptions,
    ) -> Result<Option<RegistryLookupResponse>, TransportError> {
        send_with_retries("registry lookup", opts, || self.lookup(request)).await
    }

    async fn post_entry(
        &self,
        request: &RegistryPostRequest,
        opts: &RequestOptions,
    ) -> Result<(), TransportError> {
        send_with_retries("registry update", opts, || self.store(request)).await
    }
}

#[async_trait]
impl ContentService for MemoryPortal {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        mime_type: &str,
        opts: &RequestOptions,
    ) -> Result<String, TransportError> {
        trace!("Uploading {filename} ({mime_type}), {} bytes", data.len());
        send_with_retries("upload", opts, || self.put_content(data.clone())).await
    }

    async fn download(
        &self,
        data_link: &DataLink,
        opts: &RequestOptions,
    ) -> Result<Option<Bytes>, TransportError> {
        send_with_retries("download", opts, || self.get_content(data_link)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::Result;
    use sky_protocol::registry::encode_entry;
    use sky_protocol::{gen_key_pair_from_seed, KeyPair, RegistryEntry, SignedRegistryEntry};

    fn post_request(keys: &KeyPair, data: &[u8], revision: u64) -> Result<RegistryPostRequest> {
        let entry = RegistryEntry::new(DataKey::from("key"), data.to_vec(), revision)?;
        Ok(RegistryPostRequest {
            publickey: keys.public_key,
            entry: encode_entry(&SignedRegistryEntry::new(entry, &keys.secret_key)),
        })
    }

    fn lookup_request(keys: &KeyPair) -> RegistryLookupRequest {
        RegistryLookupRequest {
            publickey: keys.public_key,
            datakey: DataKey::from("key").to_hex(),
            resolve_entry_links: false,
        }
    }

    #[tokio::test]
    async fn test_revisions_must_increase() -> Result<()> {
        let portal = MemoryPortal::new();
        let keys = gen_key_pair_from_seed("portal")?;
        let opts = RequestOptions::default();

        let skipped = portal.post_entry(&post_request(&keys, b"a", 3)?, &opts).await;
        assert!(matches!(skipped, Err(TransportError::Rejected(_))));

        portal.post_entry(&post_request(&keys, b"a", 0)?, &opts).await?;
        portal.post_entry(&post_request(&keys, b"b", 1)?, &opts).await?;
        let same = portal.post_entry(&post_request(&keys, b"c", 1)?, &opts).await;
        assert!(matches!(same, Err(TransportError::Rejected(_))));

        let stored = portal
            .get_entry(&lookup_request(&keys), &opts)
            .await?
            .ok_or_else(|| eyre::eyre!("entry is missing"))?;
        assert_eq!(stored.entry.revision, "1");
        assert_eq!(stored.entry.data, hex::encode(b"b"));
        assert!(stored.proof.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_entry_signed_by_someone_else_is_rejected() -> Result<()> {
        let portal = MemoryPortal::new();
        let keys = gen_key_pair_from_seed("portal")?;
        let other = gen_key_pair_from_seed("someone else")?;

        let mut request = post_request(&other, b"a", 0)?;
        request.publickey = keys.public_key;
        let result = portal.post_entry(&request, &RequestOptions::default()).await;
        assert!(matches!(result, Err(TransportError::Rejected(_))));
        let stored = portal
            .get_entry(&lookup_request(&keys), &RequestOptions::default())
            .await?;
        assert_eq!(stored, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_content_is_addressed_by_its_hash() -> Result<()> {
        let portal = MemoryPortal::new();
        let opts = RequestOptions::default();

        let first = portal
            .upload(Bytes::from_static(b"content"), "a", "text/plain", &opts)
            .await?;
        let second = portal
            .upload(Bytes::from_static(b"content"), "b", "text/plain", &opts)
            .await?;
        assert_eq!(first, second);

        let data_link: DataLink = first.parse()?;
        assert_eq!(
            portal.download(&data_link, &opts).await?,
            Some(Bytes::from_static(b"content"))
        );
        assert!(portal.forget_content(&data_link));
        assert_eq!(portal.download(&data_link, &opts).await?, None);
        Ok(())
    }
}
