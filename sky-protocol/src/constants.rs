// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

/// Size of a BLAKE2b digest as used throughout the registry.
pub const HASH_LENGTH: usize = 32;

/// Size of an ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Size of an ed25519 private key: the 32 bytes seed followed by the public key.
pub const PRIVATE_KEY_LENGTH: usize = 64;

/// Size of an ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// The largest payload a registry entry can carry.
pub const MAX_ENTRY_DATA_SIZE: usize = 70;

/// The largest revision that can be encoded.
pub const MAX_REVISION: u64 = u64::MAX;

/// The largest revision a client will ever write. The top value is reserved.
pub const MAX_WRITABLE_REVISION: u64 = u64::MAX - 1;

/// Size of a raw data link: a 2 bytes bitfield followed by a 32 bytes merkle root.
pub const RAW_DATA_LINK_SIZE: usize = 34;

/// Length of a data link in unpadded base64url.
pub const BASE64_ENCODED_DATA_LINK_SIZE: usize = 46;

/// Length of a data link in unpadded base32hex.
pub const BASE32_ENCODED_DATA_LINK_SIZE: usize = 55;

/// URI scheme prefixed to data links in their canonical string form.
pub const URI_SKYNET_PREFIX: &str = "sia://";

/// Payload written to an entry to mark it as deleted.
pub const DELETION_ENTRY_DATA: [u8; RAW_DATA_LINK_SIZE] = [0; RAW_DATA_LINK_SIZE];

/// Version of the JSON envelope written by SkyDB.
pub const JSON_RESPONSE_VERSION: u64 = 2;

/// Maximum number of pointer hops a registry proof may contain.
pub const DEFAULT_MAX_PROOF_HOPS: usize = 5;
