// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! Data links point at immutable uploaded content, or for v2 links at the
//! current entry of a registry coordinate.
//!
//! A link is 34 raw bytes: a 2 bytes bitfield followed by a 32 bytes root. It is
//! written as unpadded base64url (46 chars, canonical) or as unpadded lowercase
//! base32hex (55 chars), optionally behind the `sia://` prefix.

use crate::constants::{
    BASE32_ENCODED_DATA_LINK_SIZE, BASE64_ENCODED_DATA_LINK_SIZE, PUBLIC_KEY_LENGTH,
    RAW_DATA_LINK_SIZE, URI_SKYNET_PREFIX,
};
use crate::crypto::{encode_u64, hash_all, Hash, PublicKey};
use crate::error::{Error, Result};
use crate::registry::DataKey;
use data_encoding::{BASE32HEX_NOPAD, BASE64URL_NOPAD};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

/// Bitfield of a v1 link, pointing at uploaded content.
const BITFIELD_V1: [u8; 2] = [0, 0];
/// Bitfield of a v2 link, pointing at a registry entry.
const BITFIELD_V2: [u8; 2] = [1, 0];

/// Specifier of ed25519 keys, zero padded to 16 bytes when encoded.
const ED25519_SPECIFIER: &[u8] = b"ed25519";
const SPECIFIER_LENGTH: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct DataLink([u8; RAW_DATA_LINK_SIZE]);

impl DataLink {
    /// A link to uploaded content with the given merkle root.
    pub fn new_v1(root: Hash) -> Self {
        Self::with_bitfield(BITFIELD_V1, root)
    }

    /// The v2 link which always resolves to the current entry at (owner, data key).
    pub fn entry_link(owner: &PublicKey, data_key: &DataKey) -> Self {
        let root = hash_all(&[&encode_sia_public_key(owner), &data_key.hashed()]);
        Self::with_bitfield(BITFIELD_V2, root)
    }

    fn with_bitfield(bitfield: [u8; 2], root: Hash) -> Self {
        let mut bytes = [0u8; RAW_DATA_LINK_SIZE];
        bytes[..2].copy_from_slice(&bitfield);
        bytes[2..].copy_from_slice(&root);
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; RAW_DATA_LINK_SIZE] = bytes.try_into().map_err(|_| {
            Error::InvalidDataLink(format!(
                "expected {RAW_DATA_LINK_SIZE} raw bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; RAW_DATA_LINK_SIZE] {
        &self.0
    }

    pub fn is_v2(&self) -> bool {
        self.0[..2] == BITFIELD_V2
    }

    /// Canonical string form, without prefix.
    pub fn to_base64(&self) -> String {
        BASE64URL_NOPAD.encode(&self.0)
    }

    /// Lowercase base32hex form, as used in subdomains.
    pub fn to_base32(&self) -> String {
        BASE32HEX_NOPAD.encode(&self.0).to_ascii_lowercase()
    }

    fn from_base64(link: &str) -> Result<Self> {
        let bytes = BASE64URL_NOPAD
            .decode(link.as_bytes())
            .map_err(|err| Error::InvalidDataLink(format!("invalid base64: {err}")))?;
        Self::from_bytes(&bytes)
    }

    fn from_base32(link: &str) -> Result<Self> {
        let bytes = BASE32HEX_NOPAD
            .decode(link.to_ascii_uppercase().as_bytes())
            .map_err(|err| Error::InvalidDataLink(format!("invalid base32: {err}")))?;
        Self::from_bytes(&bytes)
    }
}

impl FromStr for DataLink {
    type Err = Error;

    /// Accepts either string form, with or without the `sia://` prefix.
    fn from_str(link: &str) -> Result<Self> {
        let link = trim_prefix(link);
        match link.len() {
            BASE64_ENCODED_DATA_LINK_SIZE => Self::from_base64(link),
            BASE32_ENCODED_DATA_LINK_SIZE => Self::from_base32(link),
            len => Err(Error::InvalidDataLink(format!(
                "expected {BASE64_ENCODED_DATA_LINK_SIZE} or {BASE32_ENCODED_DATA_LINK_SIZE} characters, got {len}"
            ))),
        }
    }
}

impl fmt::Display for DataLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URI_SKYNET_PREFIX}{}", self.to_base64())
    }
}

impl fmt::Debug for DataLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataLink({})", self.to_base64())
    }
}

/// Converts a base64 link into its base32 form.
pub fn convert_data_link_to_base32(link: &str) -> Result<String> {
    let link = trim_prefix(link);
    if link.len() != BASE64_ENCODED_DATA_LINK_SIZE {
        return Err(Error::InvalidDataLink(format!(
            "expected {BASE64_ENCODED_DATA_LINK_SIZE} base64 characters, got {}",
            link.len()
        )));
    }
    Ok(DataLink::from_base64(link)?.to_base32())
}

/// Converts a base32 link into its base64 form.
pub fn convert_data_link_to_base64(link: &str) -> Result<String> {
    let link = trim_prefix(link);
    if link.len() != BASE32_ENCODED_DATA_LINK_SIZE {
        return Err(Error::InvalidDataLink(format!(
            "expected {BASE32_ENCODED_DATA_LINK_SIZE} base32 characters, got {}",
            link.len()
        )));
    }
    Ok(DataLink::from_base32(link)?.to_base64())
}

/// Adds the `sia://` prefix if missing. An empty link stays empty.
pub fn format_data_link(link: &str) -> String {
    if link.is_empty() || link.starts_with(URI_SKYNET_PREFIX) {
        return link.to_string();
    }
    format!("{URI_SKYNET_PREFIX}{link}")
}

fn trim_prefix(link: &str) -> &str {
    link.strip_prefix(URI_SKYNET_PREFIX).unwrap_or(link)
}

fn encode_sia_public_key(owner: &PublicKey) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(SPECIFIER_LENGTH + 8 + PUBLIC_KEY_LENGTH);
    encoded.extend_from_slice(ED25519_SPECIFIER);
    encoded.resize(SPECIFIER_LENGTH, 0);
    encoded.extend_from_slice(&encode_u64(PUBLIC_KEY_LENGTH as u64));
    encoded.extend_from_slice(owner.as_bytes());
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE64_LINK: &str = "AAAVyJktMuK-7WRCNUvYcYq7izvhCbgDLXlT4YgechblJw";
    const BASE32_LINK: &str = "0001bi4p5kpe5fndch13aiuoe65bn2prs44rg0pdf59u320ue8bea9o";

    #[test]
    fn test_entry_link_matches_reference() {
        let owner =
            PublicKey::from_hex("89e5147864297b80f5ddf29711ba8c093e724213b0dcbefbc3860cc6d598cc35")
                .unwrap();
        let link = DataLink::entry_link(&owner, &"dataKey3".into());
        assert_eq!(
            link.to_base64(),
            "AQAZ1R-KcL4NO_xIVf0q8B1ngPVd6ec-Pu54O0Cto387Nw"
        );
        assert!(link.is_v2());
    }

    #[test]
    fn test_base32_conversions() {
        assert_eq!(convert_data_link_to_base32(BASE64_LINK).unwrap(), BASE32_LINK);
        assert_eq!(convert_data_link_to_base64(BASE32_LINK).unwrap(), BASE64_LINK);
        assert_eq!(
            convert_data_link_to_base32(&format!("sia://{BASE64_LINK}")).unwrap(),
            BASE32_LINK
        );
        assert!(convert_data_link_to_base32(BASE32_LINK).is_err());
        assert!(convert_data_link_to_base64(BASE64_LINK).is_err());
    }

    #[test]
    fn test_parse_normalises_to_canonical_form() {
        let from_base64: DataLink = BASE64_LINK.parse().unwrap();
        let from_base32: DataLink = BASE32_LINK.parse().unwrap();
        let prefixed: DataLink = format!("sia://{BASE64_LINK}").parse().unwrap();
        assert_eq!(from_base64, from_base32);
        assert_eq!(from_base64, prefixed);
        assert_eq!(from_base32.to_string(), format!("sia://{BASE64_LINK}"));
        assert!(!from_base64.is_v2());
    }

    #[test]
    fn test_parse_rejects_invalid_links() {
        assert!("".parse::<DataLink>().is_err());
        assert!("sia://abc".parse::<DataLink>().is_err());
        // Right length, not base64url.
        let bad = "!".repeat(BASE64_ENCODED_DATA_LINK_SIZE);
        assert!(bad.parse::<DataLink>().is_err());
        assert!(DataLink::from_bytes(&[0u8; 33]).is_err());
    }

    #[test]
    fn test_format_data_link() {
        assert_eq!(format_data_link(""), "");
        assert_eq!(format_data_link(BASE64_LINK), format!("sia://{BASE64_LINK}"));
        assert_eq!(
            format_data_link(&format!("sia://{BASE64_LINK}")),
            format!("sia://{BASE64_LINK}")
        );
    }

    #[test]
    fn test_serde_uses_display_form() {
        let link = DataLink::new_v1([7u8; 32]);
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(json, format!("\"{link}\""));
        assert_eq!(serde_json::from_str::<DataLink>(&json).unwrap(), link);
    }
}
