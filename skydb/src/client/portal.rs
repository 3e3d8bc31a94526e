// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! The services SkyDB talks to.
//!
//! The registry stores signed entries and the content service stores the
//! immutable blobs entries point at. Both are reached through a portal. The
//! HTTP side of a portal lives outside of this crate, any implementation of
//! these traits can back a [`crate::Client`].

use super::config::RequestOptions;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sky_protocol::registry::{RegistryLookupResponse, RegistryPostRequest};
use sky_protocol::{DataLink, PublicKey};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Errors reported by a registry or content service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The service understood the request and refused it, e.g. a registry
    /// update whose revision is not above the stored one.
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Content not found at {0}")]
    NotFound(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Errors that would come back the same on a second attempt.
    pub fn cannot_retry(&self) -> bool {
        matches!(
            self,
            TransportError::Rejected(_)
                | TransportError::NotFound(_)
                | TransportError::InvalidResponse(_)
        )
    }
}

/// A registry lookup: `GET /skynet/registry?publickey=..&datakey=..`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLookupRequest {
    pub publickey: PublicKey,
    /// Hex of the hashed data key.
    pub datakey: String,
    /// Follow entries whose data is an entry link.
    #[serde(default)]
    pub resolve_entry_links: bool,
}

#[async_trait]
pub trait RegistryService: Send + Sync {
    /// Looks an entry up. A missing entry is `Ok(None)`, not an error.
    async fn get_entry(
        &self,
        request: &RegistryLookupRequest,
        opts: &RequestOptions,
    ) -> Result<Option<RegistryLookupResponse>, TransportError>;

    /// Stores a signed entry. Refusals must come back as [`TransportError::Rejected`].
    async fn post_entry(
        &self,
        request: &RegistryPostRequest,
        opts: &RequestOptions,
    ) -> Result<(), TransportError>;
}

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Uploads bytes and returns the data link of the stored content.
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        mime_type: &str,
        opts: &RequestOptions,
    ) -> Result<String, TransportError>;

    /// Downloads the content behind a data link, `Ok(None)` when there is none.
    async fn download(
        &self,
        data_link: &DataLink,
        opts: &RequestOptions,
    ) -> Result<Option<Bytes>, TransportError>;
}

/// Runs a request following `opts`, for use by service implementations.
///
/// Every attempt is bounded by `opts.timeout`. Errors which cannot be retried
/// are returned straight away, others are retried along `opts.retry`.
pub async fn send_with_retries<T, F, Fut>(
    what: &str,
    opts: &RequestOptions,
    mut send: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    for duration in opts.retry.backoff() {
        let attempt = match opts.timeout {
            Some(timeout) => tokio::time::timeout(timeout, send())
                .await
                .unwrap_or(Err(TransportError::Timeout(timeout))),
            None => send().await,
        };
        match attempt {
            Ok(value) => return Ok(value),
            // return fatal errors
            Err(err) if err.cannot_retry() => return Err(err),
            // retry on other errors
            Err(err) => {
                warn!("{what} failed: {err:?}, retrying in {duration:?}");
                match duration {
                    Some(retry_delay) => sleep(retry_delay).await,
                    None => return Err(err),
                }
            }
        }
    }
    Err(TransportError::Network(format!(
        "{what}: the retry strategy allowed no attempt"
    )))
}
