// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


use super::config::{GetEntryOptions, RequestOptions};
use super::portal::{RegistryLookupRequest, TransportError};
use super::Client;
use sky_protocol::constants::{MAX_ENTRY_DATA_SIZE, MAX_WRITABLE_REVISION};
use sky_protocol::registry::{decode_entry, encode_entry, RegistryPostRequest, RegistryProofHop};
use sky_protocol::{DataKey, DataLink, PublicKey, RegistryEntry, SecretKey, SignedRegistryEntry};

/// Errors that can occur when dealing with registry entries
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[source] sky_protocol::Error),
    #[error("Registry entry is corrupt: {0}")]
    Corrupt(#[source] sky_protocol::Error),
    #[error("Registry entry signature is invalid")]
    BadSignature,
    #[error("Registry returned an entry for another data key: {0}")]
    UnexpectedEntry(String),
    #[error("Invalid registry proof: {0}")]
    InvalidProof(String),
    #[error("Registry rejected the update: {0}")]
    UpdateRejected(String),
    #[error("Registry request failed: {0}")]
    Transport(#[source] TransportError),
}

impl Client {
    /// Gets the entry at (owner, data key) from the registry and verifies it.
    ///
    /// `Ok(None)` means there is no entry. When the registry resolved entry links
    /// the returned entry is the final one and every hop of the proof is checked.
    pub async fn registry_get_entry(
        &self,
        public_key: &PublicKey,
        data_key: &str,
        opts: GetEntryOptions,
    ) -> Result<Option<SignedRegistryEntry>, RegistryError> {
        let data_key = DataKey::new(data_key, opts.hashed_data_key_hex)
            .map_err(RegistryError::InvalidInput)?;
        let request = self.request_options(opts.request);
        self.fetch_entry(public_key, &data_key, opts.resolve_entry_links, &request)
            .await
    }

    /// Signs the entry and stores it in the registry.
    ///
    /// The registry only accepts a revision above the stored one. A refusal comes
    /// back as [`RegistryError::UpdateRejected`] and is never retried here.
    pub async fn registry_set_entry(
        &self,
        secret_key: &SecretKey,
        entry: RegistryEntry,
        request: Option<RequestOptions>,
    ) -> Result<(), RegistryError> {
        let request = self.request_options(request);
        self.post_entry(secret_key, entry, &request).await
    }

    /// The entry link of (owner, data key): a v2 data link that always resolves
    /// to the current entry, whatever it points at.
    pub fn registry_get_entry_link(
        public_key: &PublicKey,
        data_key: &str,
        hashed_data_key_hex: bool,
    ) -> Result<DataLink, RegistryError> {
        let data_key =
            DataKey::new(data_key, hashed_data_key_hex).map_err(RegistryError::InvalidInput)?;
        Ok(DataLink::entry_link(public_key, &data_key))
    }

    pub(crate) async fn fetch_entry(
        &self,
        owner: &PublicKey,
        data_key: &DataKey,
        resolve_entry_links: bool,
        request: &RequestOptions,
    ) -> Result<Option<SignedRegistryEntry>, RegistryError> {
        let lookup = RegistryLookupRequest {
            publickey: *owner,
            datakey: data_key.to_hex(),
            resolve_entry_links,
        };
        debug!("Fetching registry entry {owner}:{data_key}");

        let response = self
            .registry
            .get_entry(&lookup, request)
            .await
            .inspect_err(|err| error!("Error fetching registry entry {owner}:{data_key}: {err:?}"))
            .map_err(RegistryError::Transport)?;
        let Some(response) = response else {
            debug!("No registry entry at {owner}:{data_key}");
            return Ok(None);
        };

        let signed = decode_entry(&response.entry).map_err(RegistryError::Corrupt)?;
        if response.proof.is_empty() {
            if signed.entry.data_key != *data_key {
                return Err(RegistryError::UnexpectedEntry(signed.entry.data_key.to_hex()));
            }
            if !signed.verify(owner) {
                warn!("Registry entry {owner}:{data_key} has an invalid signature");
                return Err(RegistryError::BadSignature);
            }
        } else {
            validate_proof(
                owner,
                data_key,
                &signed,
                &response.proof,
                self.config.max_proof_hops,
            )
            .inspect_err(|err| warn!("Rejecting registry entry {owner}:{data_key}: {err}"))?;
        }

        trace!(
            "Got registry entry {owner}:{data_key} at revision {}",
            signed.entry.revision
        );
        Ok(Some(signed))
    }

    pub(crate) async fn post_entry(
        &self,
        secret_key: &SecretKey,
        entry: RegistryEntry,
        request: &RequestOptions,
    ) -> Result<(), RegistryError> {
        if entry.data.len() > MAX_ENTRY_DATA_SIZE {
            return Err(RegistryError::InvalidInput(
                sky_protocol::Error::EntryDataTooLong {
                    len: entry.data.len(),
                    max: MAX_ENTRY_DATA_SIZE,
                },
            ));
        }
        if entry.revision > MAX_WRITABLE_REVISION {
            return Err(RegistryError::InvalidInput(
                sky_protocol::Error::InvalidRevision(format!(
                    "{} is reserved, the maximum is {MAX_WRITABLE_REVISION}",
                    entry.revision
                )),
            ));
        }

        let owner = secret_key.public_key();
        let data_key = entry.data_key.clone();
        let revision = entry.revision;
        let signed = SignedRegistryEntry::new(entry, secret_key);
        let post = RegistryPostRequest {
            publickey: owner,
            entry: encode_entry(&signed),
        };

        debug!("Storing registry entry {owner}:{data_key} at revision {revision}");
        self.registry
            .post_entry(&post, request)
            .await
            .inspect_err(|err| {
                error!("Failed to store registry entry {owner}:{data_key} at revision {revision}: {err:?}")
            })
            .map_err(|err| match err {
                TransportError::Rejected(message) => RegistryError::UpdateRejected(message),
                other => RegistryError::Transport(other),
            })
    }
}

/// Checks a chain of custody returned along with an entry reached through entry links.
///
/// The proof lists every entry visited, starting at the requested one. Each entry
/// must verify under its own owner and point at the next one through its entry
/// link, and the last one must be the returned entry.
fn validate_proof(
    owner: &PublicKey,
    data_key: &DataKey,
    entry: &SignedRegistryEntry,
    proof: &[RegistryProofHop],
    max_hops: usize,
) -> Result<(), RegistryError> {
    let hops = proof.len().saturating_sub(1);
    if hops == 0 || hops > max_hops {
        return Err(RegistryError::InvalidProof(format!(
            "{hops} hops, expected between 1 and {max_hops}"
        )));
    }

    let mut previous: Option<SignedRegistryEntry> = None;
    for (index, hop) in proof.iter().enumerate() {
        let signed = decode_entry(&hop.entry).map_err(RegistryError::Corrupt)?;
        if !signed.verify(&hop.publickey) {
            return Err(RegistryError::InvalidProof(format!(
                "hop {index} has an invalid signature"
            )));
        }
        match &previous {
            None => {
                if hop.publickey != *owner || signed.entry.data_key != *data_key {
                    return Err(RegistryError::InvalidProof(
                        "proof does not start at the requested entry".to_string(),
                    ));
                }
            }
            Some(previous) => {
                let link = DataLink::entry_link(&hop.publickey, &signed.entry.data_key);
                if previous.entry.data.as_ref() != link.as_bytes().as_slice() {
                    return Err(RegistryError::InvalidProof(format!(
                        "hop {} does not point at hop {index}",
                        index - 1
                    )));
                }
            }
        }
        previous = Some(signed);
    }

    match previous {
        Some(last) if last == *entry => Ok(()),
        _ => Err(RegistryError::InvalidProof(
            "proof does not end at the returned entry".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sky_protocol::{gen_key_pair_from_seed, KeyPair};

    struct Chain {
        owners: Vec<KeyPair>,
        entries: Vec<SignedRegistryEntry>,
    }

    impl Chain {
        /// `len` entries, each but the last pointing at the next one.
        fn new(len: usize) -> Self {
            let owners: Vec<KeyPair> = (0..len)
                .map(|i| gen_key_pair_from_seed(&format!("hop {i}")).unwrap())
                .collect();
            let keys: Vec<DataKey> = (0..len)
                .map(|i| format!("key {i}").as_str().into())
                .collect();
            let entries = (0..len)
                .map(|i| {
                    let data = match owners.get(i + 1) {
                        Some(next) => DataLink::entry_link(&next.public_key, &keys[i + 1])
                            .as_bytes()
                            .to_vec(),
                        None => b"final".to_vec(),
                    };
                    let entry = RegistryEntry::new(keys[i].clone(), data, i as u64).unwrap();
                    SignedRegistryEntry::new(entry, &owners[i].secret_key)
                })
                .collect();
            Self { owners, entries }
        }

        fn proof(&self) -> Vec<RegistryProofHop> {
            self.owners
                .iter()
                .zip(&self.entries)
                .map(|(owner, entry)| RegistryProofHop {
                    publickey: owner.public_key,
                    entry: encode_entry(entry),
                })
                .collect()
        }

        fn validate(
            &self,
            proof: &[RegistryProofHop],
            max_hops: usize,
        ) -> Result<(), RegistryError> {
            validate_proof(
                &self.owners[0].public_key,
                &self.entries[0].entry.data_key,
                self.entries.last().unwrap(),
                proof,
                max_hops,
            )
        }
    }

    #[test]
    fn test_valid_proof() {
        for len in 2..=6 {
            let chain = Chain::new(len);
            chain.validate(&chain.proof(), 5).unwrap();
        }
    }

    #[test]
    fn test_proof_hop_limits() {
        let chain = Chain::new(7);
        assert!(matches!(
            chain.validate(&chain.proof(), 5),
            Err(RegistryError::InvalidProof(_))
        ));
        chain.validate(&chain.proof(), 6).unwrap();

        let single = Chain::new(1);
        assert!(matches!(
            single.validate(&single.proof(), 5),
            Err(RegistryError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_proof_with_forged_hop() {
        let chain = Chain::new(3);
        let mut proof = chain.proof();
        // Signed by someone else than the claimed owner.
        proof[1].publickey = chain.owners[2].public_key;
        assert!(matches!(
            chain.validate(&proof, 5),
            Err(RegistryError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_proof_with_broken_link() {
        let chain = Chain::new(3);
        let other = Chain::new(2);
        let mut proof = chain.proof();
        proof[1] = other.proof()[1].clone();
        assert!(matches!(
            chain.validate(&proof, 5),
            Err(RegistryError::InvalidProof(_))
        ));
    }

    #[test]
    fn test_proof_starting_elsewhere() {
        let chain = Chain::new(3);
        let proof = chain.proof();
        let result = validate_proof(
            &chain.owners[1].public_key,
            &chain.entries[0].entry.data_key,
            chain.entries.last().unwrap(),
            &proof,
            5,
        );
        assert!(matches!(result, Err(RegistryError::InvalidProof(_))));
    }

    #[test]
    fn test_proof_not_ending_at_returned_entry() {
        let chain = Chain::new(3);
        let result = validate_proof(
            &chain.owners[0].public_key,
            &chain.entries[0].entry.data_key,
            &chain.entries[1],
            &chain.proof(),
            5,
        );
        assert!(matches!(result, Err(RegistryError::InvalidProof(_))));
    }

    #[test]
    fn test_entry_link_of_hashed_and_raw_key() {
        let owner = gen_key_pair_from_seed("links").unwrap().public_key;
        let raw = Client::registry_get_entry_link(&owner, "app", false).unwrap();
        let hashed = Client::registry_get_entry_link(&owner, &DataKey::from("app").to_hex(), true)
            .unwrap();
        assert_eq!(raw, hashed);
        assert!(raw.is_v2());
        assert!(Client::registry_get_entry_link(&owner, "not hex", true).is_err());
    }
}
