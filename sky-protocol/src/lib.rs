// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


#[macro_use]
extern crate tracing;

/// Protocol constants.
pub mod constants;
/// Binary encodings, hashes and ed25519 keys.
pub mod crypto;
/// Data links and entry links.
pub mod data_link;
/// Encrypted files sealed with a path seed.
pub mod encryption;
/// Errors.
pub mod error;
/// Registry entries and their wire format.
pub mod registry;
/// Discoverable file tweaks.
pub mod tweak;

pub use error::{Error, Result};

pub use crypto::{
    derive_child_seed, gen_key_pair_and_seed, gen_key_pair_from_seed, hash_data_key, KeyPair,
    KeyPairAndSeed, PublicKey, SecretKey, Signature,
};
pub use data_link::DataLink;
pub use registry::{DataKey, RegistryEntry, SignedRegistryEntry};

/// Re-export of Bytes used throughout the protocol
pub use bytes::Bytes;

/// A JSON object, the only kind of document SkyDB stores.
pub type JsonData = serde_json::Map<String, serde_json::Value>;
