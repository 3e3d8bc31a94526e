// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The JSON shapes exchanged with the registry service.
//!
//! Requests always carry the entry data as hex. Responses from older portals may
//! carry it as padded base64, which [`decode_entry_data`] also accepts.

use super::{validate_entry_data, DataKey, RegistryEntry, SignedRegistryEntry};
use crate::crypto::{PublicKey, Signature};
use crate::error::{Error, Result};
use bytes::Bytes;
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};

/// A signed entry as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRegistryEntry {
    /// Hex of the hashed data key.
    pub datakey: String,
    /// Hex of the entry data.
    pub data: String,
    /// Decimal string, revisions do not fit in every JSON number implementation.
    pub revision: String,
    /// Hex of the signature.
    pub signature: String,
}

/// Body of a registry update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryPostRequest {
    pub publickey: PublicKey,
    #[serde(flatten)]
    pub entry: WireRegistryEntry,
}

/// One hop of a registry proof: an entry along with the key that signed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryProofHop {
    pub publickey: PublicKey,
    #[serde(flatten)]
    pub entry: WireRegistryEntry,
}

/// Body of a successful registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLookupResponse {
    #[serde(flatten)]
    pub entry: WireRegistryEntry,
    /// Present when the lookup was resolved through entry links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proof: Vec<RegistryProofHop>,
}

/// Encodes a signed entry for the registry service.
pub fn encode_entry(entry: &SignedRegistryEntry) -> WireRegistryEntry {
    WireRegistryEntry {
        datakey: entry.entry.data_key.to_hex(),
        data: hex::encode(&entry.entry.data),
        revision: entry.entry.revision.to_string(),
        signature: entry.signature.to_hex(),
    }
}

/// Decodes and validates a signed entry received from the registry service.
///
/// The signature is only checked for length here, verifying it requires knowing
/// the owner and is left to the caller.
pub fn decode_entry(wire: &WireRegistryEntry) -> Result<SignedRegistryEntry> {
    let data_key = DataKey::new(&wire.datakey, true)?;
    let data = decode_entry_data(&wire.data)?;
    validate_entry_data(&data)?;
    let revision = wire
        .revision
        .parse::<u64>()
        .map_err(|err| Error::InvalidRevision(format!("{:?}: {err}", wire.revision)))?;
    let signature = Signature::from_hex(&wire.signature)?;
    Ok(SignedRegistryEntry {
        entry: RegistryEntry {
            data_key,
            data,
            revision,
        },
        signature,
    })
}

/// Decodes entry data sent either as hex or, by legacy portals, as padded base64.
///
/// A string that is valid hex is always read as hex.
pub fn decode_entry_data(data: &str) -> Result<Bytes> {
    if let Ok(bytes) = hex::decode(data) {
        return Ok(Bytes::from(bytes));
    }
    trace!("Entry data is not hex, trying base64");
    BASE64
        .decode(data.as_bytes())
        .map(Bytes::from)
        .map_err(|err| Error::InvalidEntryData(format!("neither hex nor base64: {err}")))
}
