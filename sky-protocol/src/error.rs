// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use thiserror::Error;

/// A specialised `Result` type for the protocol crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while encoding, decoding, signing or verifying registry data.
///
/// Every variant is either a caller mistake (caught before anything reaches the
/// network) or a malformed/forged value received from the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ---------- encoding errors
    #[error("Argument {0} does not fit in a 64-bit unsigned integer; exceeds 2^64-1")]
    IntegerOverflow(i128),
    #[error("Argument {0} does not fit in a 64-bit unsigned integer; must be non-negative")]
    NegativeInteger(i128),
    #[error("Failed to decode hex for {name}: {reason}")]
    InvalidHex { name: &'static str, reason: String },
    #[error("Invalid length for {name}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    // ---------- key errors
    #[error("Invalid ed25519 key: {0}")]
    InvalidKey(String),

    // ---------- registry entry errors
    #[error("Entry data is too long: {len} bytes, expected at most {max}")]
    EntryDataTooLong { len: usize, max: usize },
    #[error("Invalid revision: {0}")]
    InvalidRevision(String),
    #[error("Failed to decode entry data: {0}")]
    InvalidEntryData(String),
    #[error("Could not verify signature of the registry entry")]
    InvalidSignature,

    // ---------- data link errors
    #[error("Invalid data link: {0}")]
    InvalidDataLink(String),

    // ---------- encrypted files
    #[error("Invalid path seed: {0}")]
    InvalidPathSeed(String),
    #[error("Failed to encrypt file")]
    EncryptionFailed,
    #[error("Failed to decrypt file, the key or the ciphertext is invalid")]
    DecryptionFailed,
    #[error("Unsupported encrypted file version {0}")]
    UnsupportedEncryptionVersion(u8),
    #[error("Failed to parse JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
