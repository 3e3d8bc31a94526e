// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Deterministic binary encodings shared by every hash in the registry.
//!
//! All integers are little-endian and every variable length value is prefixed
//! with its length as a `u64`, so the encoding of a value never depends on the
//! encoding used to transport it.

use crate::error::{Error, Result};

/// Encodes a `u64` as 8 little-endian bytes.
pub fn encode_u64(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

/// Encodes an arbitrary integer as a `u64`, rejecting anything negative or above `2^64-1`.
pub fn encode_bigint_as_u64(n: i128) -> Result<[u8; 8]> {
    if n < 0 {
        return Err(Error::NegativeInteger(n));
    }
    let n = u64::try_from(n).map_err(|_| Error::IntegerOverflow(n))?;
    Ok(encode_u64(n))
}

/// Length prefixed bytes: `encode_u64(len) || bytes`.
pub fn encode_prefixed_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(8 + bytes.len());
    encoded.extend_from_slice(&encode_u64(bytes.len() as u64));
    encoded.extend_from_slice(bytes);
    encoded
}

/// Length prefixed UTF-8 string, no terminator and no padding.
pub fn encode_string(s: &str) -> Vec<u8> {
    encode_prefixed_bytes(s.as_bytes())
}
