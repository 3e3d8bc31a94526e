// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

mod encoding;
mod keys;

pub use encoding::{encode_bigint_as_u64, encode_prefixed_bytes, encode_string, encode_u64};
pub use keys::{
    gen_key_pair_and_seed, gen_key_pair_from_seed, KeyPair, KeyPairAndSeed, PublicKey, SecretKey,
    Signature,
};
pub(crate) use keys::decode_hex;

use crate::constants::HASH_LENGTH;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// A 256 bits BLAKE2b digest.
pub type Hash = [u8; HASH_LENGTH];

/// BLAKE2b-256 of the given bytes.
pub fn hash(data: &[u8]) -> Hash {
    hash_all(&[data])
}

/// BLAKE2b-256 of the concatenation of all the given parts.
pub fn hash_all(parts: &[&[u8]]) -> Hash {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; HASH_LENGTH];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Hashes a data key into the 32 bytes key used to look entries up on the network.
pub fn hash_data_key(data_key: &str) -> Hash {
    hash(&encode_string(data_key))
}

/// Derives a child seed from a master seed and a sub seed, returned as hex.
pub fn derive_child_seed(master_seed: &str, seed: &str) -> String {
    let child = hash_all(&[&encode_string(master_seed), &encode_string(seed)]);
    hex::encode(child)
}

/// SHA-512 of the given bytes.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let digest = ring::digest::digest(&ring::digest::SHA512, data);
    let mut out = [0u8; 64];
    out.copy_from_slice(digest.as_ref());
    out
}
