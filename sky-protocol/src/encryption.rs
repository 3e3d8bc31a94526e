// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! Encrypted files, shared through a secret path seed.
//!
//! The lookup key and the symmetric key are both derived from the path seed but
//! through unrelated derivations, so publishing the lookup key reveals nothing
//! about the content key.

use crate::crypto::{hash, sha512};
use crate::error::{Error, Result};
use crate::JsonData;
use rand::RngCore;
use ring::aead::{
    Aad, BoundKey, Nonce, NonceSequence, OpeningKey, SealingKey, UnboundKey, CHACHA20_POLY1305,
};
use ring::error::Unspecified;

pub const ENCRYPTION_KEY_LENGTH: usize = 32;
const ENCRYPTION_NONCE_LENGTH: usize = 12;
const ENCRYPTION_HEADER_LENGTH: usize = 16;
const ENCRYPTION_TAG_LENGTH: usize = 16;
/// Version written in the first byte of the encrypted header.
const ENCRYPTED_JSON_VERSION: u8 = 1;

/// Length in bytes of a file path seed.
pub const PATH_SEED_FILE_LENGTH: usize = 32;
/// Length in bytes of a directory path seed.
pub const PATH_SEED_DIRECTORY_LENGTH: usize = 64;

const SALT_ENCRYPTION: &[u8] = b"encryption";
const SALT_ENCRYPTED_CHILD: &[u8] = b"encrypted filesystem child";

/// The symmetric key of an encrypted file.
pub type EncryptionKey = [u8; ENCRYPTION_KEY_LENGTH];

struct NonceSeq([u8; ENCRYPTION_NONCE_LENGTH]);

impl NonceSequence for NonceSeq {
    fn advance(&mut self) -> std::result::Result<Nonce, Unspecified> {
        Nonce::try_assume_unique_for_key(&self.0)
    }
}

/// Decodes a path seed, which must be the hex of a file or a directory seed.
pub fn decode_path_seed(path_seed: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(path_seed)
        .map_err(|err| Error::InvalidPathSeed(format!("not hex: {err}")))?;
    if bytes.len() != PATH_SEED_FILE_LENGTH && bytes.len() != PATH_SEED_DIRECTORY_LENGTH {
        return Err(Error::InvalidPathSeed(format!(
            "expected {PATH_SEED_FILE_LENGTH} or {PATH_SEED_DIRECTORY_LENGTH} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// The hashed data key under which the file is stored, as hex.
pub fn derive_encrypted_file_tweak(path_seed: &str) -> Result<String> {
    let seed = decode_path_seed(path_seed)?;
    Ok(hex::encode(hash(&hash(&seed))))
}

/// The symmetric key the file is encrypted with.
pub fn derive_encrypted_file_key_entropy(path_seed: &str) -> Result<EncryptionKey> {
    let seed = decode_path_seed(path_seed)?;
    let digest = sha512(&[sha512(SALT_ENCRYPTION), sha512(&seed)].concat());
    let mut key = [0u8; ENCRYPTION_KEY_LENGTH];
    key.copy_from_slice(&digest[..ENCRYPTION_KEY_LENGTH]);
    Ok(key)
}

/// Derives the path seed of `sub_path` below the directory seed `path_seed`.
///
/// Every component but the last is a directory. The last one is a directory
/// when `is_directory` is set, and the returned seed has the matching length.
pub fn derive_encrypted_path_seed(
    path_seed: &str,
    sub_path: &str,
    is_directory: bool,
) -> Result<String> {
    let mut seed = decode_path_seed(path_seed)?;
    if seed.len() != PATH_SEED_DIRECTORY_LENGTH {
        return Err(Error::InvalidPathSeed(
            "only directory seeds have children".to_string(),
        ));
    }

    let components: Vec<&str> = sub_path.trim_matches('/').split('/').collect();
    if components.iter().any(|component| component.is_empty()) {
        return Err(Error::InvalidPathSeed(format!(
            "sub path {sub_path:?} has an empty component"
        )));
    }

    let last = components.len() - 1;
    for (index, component) in components.into_iter().enumerate() {
        let directory = index != last || is_directory;
        let parent = sha512(&[seed.as_slice(), component.as_bytes()].concat());
        let child = sha512(&[sha512(SALT_ENCRYPTED_CHILD), parent].concat());
        let len = if directory {
            PATH_SEED_DIRECTORY_LENGTH
        } else {
            PATH_SEED_FILE_LENGTH
        };
        seed = child[..len].to_vec();
    }
    Ok(hex::encode(seed))
}

/// Encrypts a JSON object as `nonce || sealed(header || json)`.
pub fn encrypt_json_file(json: &JsonData, key: &EncryptionKey) -> Result<Vec<u8>> {
    let mut nonce = [0u8; ENCRYPTION_NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut plaintext = vec![0u8; ENCRYPTION_HEADER_LENGTH];
    plaintext[0] = ENCRYPTED_JSON_VERSION;
    plaintext.extend_from_slice(&serde_json::to_vec(json)?);
    seal(plaintext, key, nonce)
}

/// Decrypts a file sealed by [`encrypt_json_file`].
pub fn decrypt_json_file(data: &[u8], key: &EncryptionKey) -> Result<JsonData> {
    if data.len() < ENCRYPTION_NONCE_LENGTH + ENCRYPTION_HEADER_LENGTH + ENCRYPTION_TAG_LENGTH {
        warn!("Encrypted file of {} bytes is too short", data.len());
        return Err(Error::DecryptionFailed);
    }
    let (nonce, ciphertext) = data.split_at(ENCRYPTION_NONCE_LENGTH);
    let nonce: [u8; ENCRYPTION_NONCE_LENGTH] =
        nonce.try_into().map_err(|_| Error::DecryptionFailed)?;

    let unbound_key =
        UnboundKey::new(&CHACHA20_POLY1305, key).map_err(|_| Error::DecryptionFailed)?;
    let mut opening_key = OpeningKey::new(unbound_key, NonceSeq(nonce));
    let mut buffer = ciphertext.to_vec();
    let plaintext = opening_key
        .open_in_place(Aad::empty(), &mut buffer)
        .map_err(|_| Error::DecryptionFailed)?;

    let (header, json) = plaintext.split_at(ENCRYPTION_HEADER_LENGTH);
    if header[0] != ENCRYPTED_JSON_VERSION {
        return Err(Error::UnsupportedEncryptionVersion(header[0]));
    }
    match serde_json::from_slice::<serde_json::Value>(json)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(Error::Json(format!(
            "expected an object in the encrypted file, got {other}"
        ))),
    }
}

fn seal(
    mut plaintext: Vec<u8>,
    key: &EncryptionKey,
    nonce: [u8; ENCRYPTION_NONCE_LENGTH],
) -> Result<Vec<u8>> {
    let unbound_key =
        UnboundKey::new(&CHACHA20_POLY1305, key).map_err(|_| Error::EncryptionFailed)?;
    let mut sealing_key = SealingKey::new(unbound_key, NonceSeq(nonce));
    sealing_key
        .seal_in_place_append_tag(Aad::empty(), &mut plaintext)
        .map_err(|_| Error::EncryptionFailed)?;

    let mut sealed = Vec::with_capacity(ENCRYPTION_NONCE_LENGTH + plaintext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&plaintext);
    Ok(sealed)
}
