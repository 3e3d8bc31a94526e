// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::constants::{PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::error::{Error, Result};
use rand::RngCore;
use ring::signature::{Ed25519KeyPair, KeyPair as _, UnparsedPublicKey, ED25519};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, LazyLock};

/// Number of iterations for pbkdf2 when stretching a seed into a key.
static PBKDF2_ITERATIONS: LazyLock<NonZeroU32> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // NonZeroU32::new(1000) is infallible
    NonZeroU32::new(1000).expect("Infallible")
});

/// Length in bytes of the random seed produced by [`gen_key_pair_and_seed`].
const RANDOM_SEED_LENGTH: usize = 32;

/// An ed25519 public key, the owner of a registry namespace.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| Error::InvalidLength {
                name: "public key",
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = decode_hex("public key", hex)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Returns `true` if the signature matches the message.
    pub fn verify(&self, signature: &Signature, msg: &[u8]) -> bool {
        UnparsedPublicKey::new(&ED25519, &self.0)
            .verify(msg, &signature.0)
            .is_ok()
    }
}

/// Hex, so keys can be copy pasted between apps.
impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex).map_err(|e| {
            serde::de::Error::custom(format!("Failed to deserialize PublicKey from hex: {e}"))
        })
    }
}

/// The secret half of an ed25519 key pair.
///
/// In hex form it is the 32 bytes seed followed by the 32 bytes public key, the
/// layout used by the portal and by other registry clients.
#[derive(Clone)]
pub struct SecretKey {
    seed: [u8; 32],
    key_pair: Arc<Ed25519KeyPair>,
}

impl SecretKey {
    /// Builds a secret key from a 32 bytes ed25519 seed.
    pub fn from_seed(seed: [u8; 32]) -> Result<Self> {
        let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed)
            .map_err(|err| Error::InvalidKey(err.to_string()))?;
        Ok(Self {
            seed,
            key_pair: Arc::new(key_pair),
        })
    }

    /// Parses the 64 bytes `seed || public key` hex form.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = decode_hex("private key", hex)?;
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(Error::InvalidLength {
                name: "private key",
                expected: PRIVATE_KEY_LENGTH,
                actual: bytes.len(),
            });
        }
        let (seed, public) = bytes.split_at(32);
        let mut seed_bytes = [0u8; 32];
        seed_bytes.copy_from_slice(seed);
        let sk = Self::from_seed(seed_bytes)?;
        if sk.public_key().as_bytes().as_slice() != public {
            return Err(Error::InvalidKey(
                "public key half does not match the seed".to_string(),
            ));
        }
        Ok(sk)
    }

    pub fn to_hex(&self) -> String {
        let mut bytes = Vec::with_capacity(PRIVATE_KEY_LENGTH);
        bytes.extend_from_slice(&self.seed);
        bytes.extend_from_slice(self.public_key().as_bytes());
        hex::encode(bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(self.key_pair.public_key().as_ref());
        PublicKey(bytes)
    }

    /// Signs the given message
    pub fn sign(&self, msg: &[u8]) -> Signature {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes.copy_from_slice(self.key_pair.sign(msg).as_ref());
        Signature(bytes)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// An ed25519 signature over a registry entry hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| Error::InvalidLength {
                name: "signature",
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = decode_hex("signature", hex)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Signature({}..)", &self.to_hex()[0..8])
    }
}

/// A public key with its matching secret key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

/// A [`KeyPair`] along with the seed it was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairAndSeed {
    pub key_pair: KeyPair,
    pub seed: String,
}

/// Deterministically generates a key pair from a seed string.
///
/// The seed is stretched with PBKDF2-HMAC-SHA256 (empty salt, 1000 iterations)
/// into the 32 bytes ed25519 seed, so the same seed always yields the same keys.
pub fn gen_key_pair_from_seed(seed: &str) -> Result<KeyPair> {
    let mut derived = [0u8; 32];
    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        *PBKDF2_ITERATIONS,
        &[],
        seed.as_bytes(),
        &mut derived,
    );
    let secret_key = SecretKey::from_seed(derived)?;
    Ok(KeyPair {
        public_key: secret_key.public_key(),
        secret_key,
    })
}

/// Generates a fresh random seed and the key pair derived from it.
pub fn gen_key_pair_and_seed() -> Result<KeyPairAndSeed> {
    let mut bytes = [0u8; RANDOM_SEED_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    let seed = hex::encode(bytes);
    let key_pair = gen_key_pair_from_seed(&seed)?;
    Ok(KeyPairAndSeed { key_pair, seed })
}

pub(crate) fn decode_hex(name: &'static str, hex: &str) -> Result<Vec<u8>> {
    hex::decode(hex).map_err(|err| Error::InvalidHex {
        name,
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "c1197e1275fbf570d21dde01a00af83ed4a743d1884e4a09cebce0dd21ae254c";

    #[test]
    fn test_gen_key_pair_from_seed_golden() {
        let key_pair = gen_key_pair_from_seed(SEED).unwrap();
        assert_eq!(
            key_pair.public_key.to_hex(),
            "f8a7da8324fabb9d57bb32c59c48d4ba304d08ee5f1297a46836cf841da71c80"
        );
        assert_eq!(
            key_pair.secret_key.to_hex(),
            "c404ff07fba961000dfb25ece7477f45b109b50a5169a45f3fb239343002c1cff8a7da8324fabb9d57bb32c59c48d4ba304d08ee5f1297a46836cf841da71c80"
        );
    }

    #[test]
    fn test_gen_key_pair_from_seed_is_deterministic() {
        let first = gen_key_pair_from_seed("some seed").unwrap();
        let second = gen_key_pair_from_seed("some seed").unwrap();
        assert_eq!(first, second);
        assert_ne!(first, gen_key_pair_from_seed("another seed").unwrap());
    }

    #[test]
    fn test_secret_key_hex_round_trip() {
        let KeyPairAndSeed { key_pair, seed } = gen_key_pair_and_seed().unwrap();
        assert_eq!(seed.len(), 64);
        let parsed = SecretKey::from_hex(&key_pair.secret_key.to_hex()).unwrap();
        assert_eq!(parsed, key_pair.secret_key);
        assert_eq!(parsed.public_key(), key_pair.public_key);
    }

    #[test]
    fn test_secret_key_rejects_mismatched_public_half() {
        let a = gen_key_pair_and_seed().unwrap().key_pair;
        let b = gen_key_pair_and_seed().unwrap().key_pair;
        let forged = format!(
            "{}{}",
            &a.secret_key.to_hex()[..64],
            b.public_key.to_hex()
        );
        assert!(matches!(
            SecretKey::from_hex(&forged),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(
            SecretKey::from_hex("abcd"),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_sign_and_verify() {
        let key_pair = gen_key_pair_from_seed(SEED).unwrap();
        let sig = key_pair.secret_key.sign(b"message");
        assert!(key_pair.public_key.verify(&sig, b"message"));
        assert!(!key_pair.public_key.verify(&sig, b"other message"));

        let other = gen_key_pair_from_seed("other").unwrap();
        assert!(!other.public_key.verify(&sig, b"message"));

        let parsed = Signature::from_hex(&sig.to_hex()).unwrap();
        assert_eq!(parsed, sig);
        assert!(Signature::from_bytes(&[0; 63]).is_err());
    }
}
