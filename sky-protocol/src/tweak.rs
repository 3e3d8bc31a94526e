// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


use crate::crypto::{hash, hash_all, Hash};

const DISCOVERABLE_TWEAK_VERSION: u8 = 1;

/// Derives the data key of a discoverable file from its path, as hex.
///
/// The result is already hashed and must be used with `hashed_data_key_hex`.
pub fn derive_discoverable_file_tweak(path: &str) -> String {
    hex::encode(discoverable_tweak_hash(path))
}

fn discoverable_tweak_hash(path: &str) -> Hash {
    let component_hashes: Vec<Hash> = path
        .trim_matches('/')
        .split('/')
        .map(|component| hash(component.as_bytes()))
        .collect();

    let mut parts: Vec<&[u8]> = Vec::with_capacity(component_hashes.len() + 1);
    let version = [DISCOVERABLE_TWEAK_VERSION];
    parts.push(&version);
    parts.extend(component_hashes.iter().map(|h| h.as_slice()));
    hash_all(&parts)
}
