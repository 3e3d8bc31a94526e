// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! Consistent JSON documents on top of a signed, revisioned registry.
//!
//! # Example
//!
//! ```no_run
//! use skydb::{Client, GetJsonOptions, JsonData, SetJsonOptions};
//! # use std::sync::Arc;
//! # async fn example(
//! #     registry: Arc<dyn skydb::RegistryService>,
//! #     content: Arc<dyn skydb::ContentService>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(registry, content);
//! let keys = skydb::gen_key_pair_from_seed("my secret seed")?;
//!
//! let mut json = JsonData::new();
//! json.insert("message".to_string(), "hello".into());
//! client
//!     .set_json(&keys.secret_key, "app/settings", json, SetJsonOptions::default())
//!     .await?;
//!
//! let response = client
//!     .get_json(&keys.public_key, "app/settings", GetJsonOptions::default())
//!     .await?;
//! println!("{:?}", response.data());
//! # Ok(())
//! # }
//! ```
//!
//! # Consistency
//!
//! Every entry carries a revision and the registry only accepts a higher one.
//! Each [`Client`] remembers the revisions it has seen in its [`RevisionCache`]
//! and assigns the next revision under a per entry lock, so that concurrent
//! writes from one client never reuse or skip a revision. Writes racing from
//! different clients are arbitrated by the registry, the loser gets
//! [`SkyDbError::RegistryUpdate`].
//!
//! # Features
//!
//! - `loud`: Print debug information to stdout

#[macro_use]
extern crate tracing;

pub mod client;

/// Client Operation config types
pub use client::config::{
    ClientConfig, GetEntryOptions, GetJsonOptions, RequestOptions, RetryStrategy, SetJsonOptions,
};

// Collaborators the client talks to
pub use client::portal::{
    send_with_retries, ContentService, RegistryLookupRequest, RegistryService, TransportError,
};

// Re-exports of the protocol types
pub use sky_protocol::encryption::{derive_encrypted_file_tweak, derive_encrypted_path_seed};
pub use sky_protocol::tweak::derive_discoverable_file_tweak;
pub use sky_protocol::{
    derive_child_seed, gen_key_pair_and_seed, gen_key_pair_from_seed, DataKey, DataLink, JsonData,
    KeyPair, KeyPairAndSeed, PublicKey, SecretKey, Signature, SignedRegistryEntry,
};

#[doc(no_inline)] // Place this under 'Re-exports' in the docs.
pub use bytes::Bytes;

#[doc(inline)]
pub use client::{
    db::{SetResponse, SkyDbResponse},
    registry::RegistryError,
    revision_cache::{RevisionCache, RevisionError},
    Client, SkyDbError,
};
