// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod wire;

pub use wire::{
    decode_entry, decode_entry_data, encode_entry, RegistryLookupResponse, RegistryPostRequest,
    RegistryProofHop, WireRegistryEntry,
};

use crate::constants::{DELETION_ENTRY_DATA, HASH_LENGTH, MAX_ENTRY_DATA_SIZE};
use crate::crypto::{decode_hex, encode_prefixed_bytes, encode_u64, hash_all, hash_data_key};
use crate::crypto::{Hash, PublicKey, SecretKey, Signature};
use crate::error::{Error, Result};
use bytes::Bytes;
use std::fmt;

/// The key of an entry within its owner's namespace.
///
/// Callers either hand over the raw string, hashed before anything is sent, or
/// the hex of an already hashed key which is passed through untouched. Both
/// forms of the same logical key compare equal.
#[derive(Clone)]
pub enum DataKey {
    Raw(String),
    Hashed(Hash),
}

impl DataKey {
    /// Parses a caller supplied data key.
    pub fn new(data_key: &str, hashed_data_key_hex: bool) -> Result<Self> {
        if !hashed_data_key_hex {
            return Ok(DataKey::Raw(data_key.to_string()));
        }
        let bytes = decode_hex("hashed data key", data_key)?;
        let hashed: Hash = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::InvalidLength {
                name: "hashed data key",
                expected: HASH_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(DataKey::Hashed(hashed))
    }

    /// The 32 bytes key as seen on the wire.
    pub fn hashed(&self) -> Hash {
        match self {
            DataKey::Raw(key) => hash_data_key(key),
            DataKey::Hashed(hashed) => *hashed,
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.hashed())
    }
}

impl From<&str> for DataKey {
    fn from(key: &str) -> Self {
        DataKey::Raw(key.to_string())
    }
}

impl PartialEq for DataKey {
    fn eq(&self, other: &Self) -> bool {
        self.hashed() == other.hashed()
    }
}

impl Eq for DataKey {}

impl std::hash::Hash for DataKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hashed().hash(state)
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKey::Raw(key) => write!(f, "DataKey({key:?})"),
            DataKey::Hashed(hashed) => write!(f, "DataKey(0x{})", hex::encode(hashed)),
        }
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKey::Raw(key) => write!(f, "{key}"),
            DataKey::Hashed(hashed) => write!(f, "{}", hex::encode(hashed)),
        }
    }
}

/// A versioned payload stored by the registry at (owner, data key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub data_key: DataKey,
    pub data: Bytes,
    /// Only an entry with a strictly higher revision can replace this one.
    pub revision: u64,
}

impl RegistryEntry {
    /// Creates an entry, rejecting payloads the registry would not store.
    pub fn new(data_key: DataKey, data: impl Into<Bytes>, revision: u64) -> Result<Self> {
        let data = data.into();
        validate_entry_data(&data)?;
        Ok(Self {
            data_key,
            data,
            revision,
        })
    }

    /// The bytes that get signed, see [`hash_registry_entry`].
    pub fn hash(&self) -> Hash {
        hash_registry_entry(self)
    }

    pub fn sign(&self, secret_key: &SecretKey) -> Signature {
        secret_key.sign(&self.hash())
    }

    pub fn verify(&self, owner: &PublicKey, signature: &Signature) -> bool {
        owner.verify(signature, &self.hash())
    }

    /// Whether this entry is a tombstone left by a delete.
    pub fn is_deleted(&self) -> bool {
        self.data.as_ref() == DELETION_ENTRY_DATA.as_slice()
    }
}

/// Hash of an entry: `hashed data key || prefixed data || revision`.
///
/// Signatures are computed over this hash so that verification does not depend
/// on how the data field was transported.
pub fn hash_registry_entry(entry: &RegistryEntry) -> Hash {
    hash_all(&[
        &entry.data_key.hashed(),
        &encode_prefixed_bytes(&entry.data),
        &encode_u64(entry.revision),
    ])
}

/// An entry along with its owner's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRegistryEntry {
    pub entry: RegistryEntry,
    pub signature: Signature,
}

impl SignedRegistryEntry {
    pub fn new(entry: RegistryEntry, secret_key: &SecretKey) -> Self {
        let signature = entry.sign(secret_key);
        Self { entry, signature }
    }

    pub fn verify(&self, owner: &PublicKey) -> bool {
        self.entry.verify(owner, &self.signature)
    }
}

pub(crate) fn validate_entry_data(data: &[u8]) -> Result<()> {
    if data.len() > MAX_ENTRY_DATA_SIZE {
        return Err(Error::EntryDataTooLong {
            len: data.len(),
            max: MAX_ENTRY_DATA_SIZE,
        });
    }
    Ok(())
}
