// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


pub mod config;
pub mod db;
pub mod files;
pub mod portal;
pub mod registry;
pub mod revision_cache;

use config::{ClientConfig, RequestOptions};
use portal::{ContentService, RegistryService, TransportError};
use registry::RegistryError;
use revision_cache::{RevisionCache, RevisionError};
use std::sync::Arc;

/// Represents a client of a SkyDB portal.
///
/// Clones share the same services and revision cache. Two clients created
/// separately keep separate caches, even when they talk to the same portal.
///
/// # Example
///
/// ```no_run
/// # use skydb::{Client, ContentService, RegistryService, gen_key_pair_from_seed};
/// # use std::sync::Arc;
/// # async fn example<P: RegistryService + ContentService + 'static>(portal: Arc<P>) -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::from_portal(portal);
/// let keys = gen_key_pair_from_seed("my app seed")?;
///
/// let mut json = skydb::JsonData::new();
/// json.insert("message".to_string(), "hello".into());
/// client.set_json(&keys.secret_key, "app", json, Default::default()).await?;
///
/// let response = client.get_json(&keys.public_key, "app", Default::default()).await?;
/// println!("{:?}", response.data());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) registry: Arc<dyn RegistryService>,
    pub(crate) content: Arc<dyn ContentService>,
    pub(crate) revision_cache: Arc<RevisionCache>,
    /// The configuration for operations on the client.
    pub(crate) config: ClientConfig,
}

/// Errors returned by the SkyDB operations.
///
/// Only [`SkyDbError::Transport`] can be worth retrying as is. A concurrent access
/// or a rejected update needs fresh state first, everything else is final.
#[derive(Debug, thiserror::Error)]
pub enum SkyDbError {
    /// The caller passed something unusable. Raised before any request is sent.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Another operation of this client changed the entry's revision first.
    #[error("Concurrent access prevented on entry {key}, retry with fresh state")]
    ConcurrentAccess { key: String },
    /// The registry refused the update, usually because another writer got there first.
    #[error("Registry rejected the update: {message}")]
    RegistryUpdate { message: String },
    /// A signature, a proof or an entry from the registry does not check out.
    #[error("Verification failed: {0}")]
    Verification(String),
    /// Content could not be decoded.
    #[error("Failed to decode: {0}")]
    Decode(String),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Entry {key} reached the maximum revision {max}")]
    RevisionOverflow { key: String, max: u64 },
}

impl SkyDbError {
    pub fn is_concurrent_access(&self) -> bool {
        matches!(self, SkyDbError::ConcurrentAccess { .. })
    }

    pub fn is_registry_update(&self) -> bool {
        matches!(self, SkyDbError::RegistryUpdate { .. })
    }
}

impl From<RegistryError> for SkyDbError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidInput(err) => SkyDbError::Validation(err.to_string()),
            RegistryError::UpdateRejected(message) => SkyDbError::RegistryUpdate { message },
            RegistryError::Transport(err) => SkyDbError::Transport(err),
            err @ (RegistryError::Corrupt(_)
            | RegistryError::BadSignature
            | RegistryError::UnexpectedEntry(_)
            | RegistryError::InvalidProof(_)) => SkyDbError::Verification(err.to_string()),
        }
    }
}

impl From<RevisionError> for SkyDbError {
    fn from(err: RevisionError) -> Self {
        match err {
            RevisionError::ConcurrentAccess { key } => SkyDbError::ConcurrentAccess { key },
            RevisionError::Overflow { key, max } => SkyDbError::RevisionOverflow { key, max },
        }
    }
}

impl Client {
    /// Creates a client talking to the given services, with the default configuration.
    pub fn new(registry: Arc<dyn RegistryService>, content: Arc<dyn ContentService>) -> Self {
        Self::with_config(registry, content, ClientConfig::default())
    }

    pub fn with_config(
        registry: Arc<dyn RegistryService>,
        content: Arc<dyn ContentService>,
        config: ClientConfig,
    ) -> Self {
        debug!("Creating client with {config:?}");
        Self {
            registry,
            content,
            revision_cache: Arc::new(RevisionCache::new()),
            config,
        }
    }

    /// Creates a client from a portal serving both the registry and the content.
    pub fn from_portal<P>(portal: Arc<P>) -> Self
    where
        P: RegistryService + ContentService + 'static,
    {
        Self::from_portal_with_config(portal, ClientConfig::default())
    }

    pub fn from_portal_with_config<P>(portal: Arc<P>, config: ClientConfig) -> Self
    where
        P: RegistryService + ContentService + 'static,
    {
        let registry: Arc<dyn RegistryService> = Arc::<P>::clone(&portal);
        Self::with_config(registry, portal, config)
    }

    /// The revisions this client knows about.
    pub fn revision_cache(&self) -> &RevisionCache {
        &self.revision_cache
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Per call options win over the client's.
    pub(crate) fn request_options(&self, custom: Option<RequestOptions>) -> RequestOptions {
        custom.unwrap_or(self.config.request)
    }
}
