// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! JSON documents and raw entry data on top of the registry.
//!
//! An entry holds a data link to uploaded content, wrapped in the
//! `{ "_data": .., "_v": 2 }` envelope for JSON. Every write goes through the
//! revision cache: the revision is the cached one plus one, and the registry is
//! only read to seed the cache when this client has not seen the entry yet.

use super::config::{GetEntryOptions, GetJsonOptions, RequestOptions, SetJsonOptions};
use super::portal::TransportError;
use super::{Client, SkyDbError};
use bytes::Bytes;
use futures::future::{ready, try_join};
use serde::Serialize;
use serde_json::Value;
use sky_protocol::constants::{DELETION_ENTRY_DATA, JSON_RESPONSE_VERSION, MAX_ENTRY_DATA_SIZE};
use sky_protocol::{DataKey, DataLink, JsonData, PublicKey, RegistryEntry, SecretKey};
use std::future::Future;

const JSON_MIME_TYPE: &str = "application/json";
const RAW_BYTES_MIME_TYPE: &str = "application/octet-stream";

const ENVELOPE_DATA_FIELD: &str = "_data";
const ENVELOPE_VERSION_FIELD: &str = "_v";

/// The outcome of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum SkyDbResponse<T> {
    /// There is no entry, or it was deleted.
    Absent,
    /// The entry still points at the caller's cached data link, nothing was downloaded.
    Unchanged { data_link: DataLink },
    Found { data: T, data_link: DataLink },
}

impl<T> SkyDbResponse<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            SkyDbResponse::Found { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            SkyDbResponse::Found { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn data_link(&self) -> Option<&DataLink> {
        match self {
            SkyDbResponse::Absent => None,
            SkyDbResponse::Unchanged { data_link } | SkyDbResponse::Found { data_link, .. } => {
                Some(data_link)
            }
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SkyDbResponse::Absent)
    }

    fn try_map<U, E>(
        self,
        f: impl FnOnce(T, &DataLink) -> Result<U, E>,
    ) -> Result<SkyDbResponse<U>, E> {
        Ok(match self {
            SkyDbResponse::Absent => SkyDbResponse::Absent,
            SkyDbResponse::Unchanged { data_link } => SkyDbResponse::Unchanged { data_link },
            SkyDbResponse::Found { data, data_link } => SkyDbResponse::Found {
                data: f(data, &data_link)?,
                data_link,
            },
        })
    }
}

/// What a write stored, along with the link to the uploaded content.
#[derive(Debug, Clone, PartialEq)]
pub struct SetResponse<T> {
    pub data: T,
    pub data_link: DataLink,
}

#[derive(Serialize)]
struct JsonEnvelope<'a> {
    #[serde(rename = "_data")]
    data: &'a JsonData,
    #[serde(rename = "_v")]
    version: u64,
}

impl Client {
    /// Gets the JSON at (owner, data key).
    ///
    /// Content written before the envelope existed is returned as is.
    pub async fn get_json(
        &self,
        public_key: &PublicKey,
        data_key: &str,
        opts: GetJsonOptions,
    ) -> Result<SkyDbResponse<JsonData>, SkyDbError> {
        self.get_raw_bytes(public_key, data_key, opts)
            .await?
            .try_map(|content, data_link| parse_json_content(&content, data_link))
    }

    /// Uploads the JSON in its envelope and points the entry at it.
    pub async fn set_json(
        &self,
        secret_key: &SecretKey,
        data_key: &str,
        json: JsonData,
        opts: SetJsonOptions,
    ) -> Result<SetResponse<JsonData>, SkyDbError> {
        let data_key = parse_data_key(data_key, opts.hashed_data_key_hex)?;
        let request = self.request_options(opts.request);
        let envelope = serde_json::to_vec(&JsonEnvelope {
            data: &json,
            version: JSON_RESPONSE_VERSION,
        })
        .map_err(|err| SkyDbError::Validation(format!("JSON cannot be serialized: {err}")))?;

        let data_link = self
            .upload_and_update(
                secret_key,
                &data_key,
                Bytes::from(envelope),
                JSON_MIME_TYPE,
                &request,
            )
            .await?;
        Ok(SetResponse {
            data: json,
            data_link,
        })
    }

    /// Marks the JSON at (owner, data key) as deleted.
    ///
    /// The entry stays in the registry with the deletion sentinel as data and a
    /// higher revision. It reads as absent and can be written again.
    pub async fn delete_json(
        &self,
        secret_key: &SecretKey,
        data_key: &str,
        opts: SetJsonOptions,
    ) -> Result<(), SkyDbError> {
        self.delete_entry_data(secret_key, data_key, opts).await
    }

    /// Points the entry at existing content.
    pub async fn set_data_link(
        &self,
        secret_key: &SecretKey,
        data_key: &str,
        data_link: &DataLink,
        opts: SetJsonOptions,
    ) -> Result<(), SkyDbError> {
        let data_key = parse_data_key(data_key, opts.hashed_data_key_hex)?;
        let request = self.request_options(opts.request);
        let data = Bytes::copy_from_slice(data_link.as_bytes());
        self.update_entry(secret_key, &data_key, ready(Ok(((), data))), &request)
            .await
    }

    /// Gets the raw data of the entry, `None` when absent or deleted.
    pub async fn get_entry_data(
        &self,
        public_key: &PublicKey,
        data_key: &str,
        opts: GetEntryOptions,
    ) -> Result<Option<Bytes>, SkyDbError> {
        let data_key = parse_data_key(data_key, opts.hashed_data_key_hex)?;
        let request = self.request_options(opts.request);
        self.read_entry_data(public_key, &data_key, opts.resolve_entry_links, &request)
            .await
    }

    /// Stores small raw data directly in the entry.
    pub async fn set_entry_data(
        &self,
        secret_key: &SecretKey,
        data_key: &str,
        data: &[u8],
        opts: SetJsonOptions,
    ) -> Result<Bytes, SkyDbError> {
        if data == DELETION_ENTRY_DATA.as_slice() {
            return Err(SkyDbError::Validation(
                "the data is the deletion sentinel, use delete_entry_data instead".to_string(),
            ));
        }
        if data.len() > MAX_ENTRY_DATA_SIZE {
            return Err(SkyDbError::Validation(format!(
                "entry data is {} bytes, the maximum is {MAX_ENTRY_DATA_SIZE}",
                data.len()
            )));
        }
        let data_key = parse_data_key(data_key, opts.hashed_data_key_hex)?;
        let request = self.request_options(opts.request);
        let data = Bytes::copy_from_slice(data);
        self.update_entry(
            secret_key,
            &data_key,
            ready(Ok((data.clone(), data))),
            &request,
        )
        .await
    }

    /// Writes the deletion sentinel to the entry.
    pub async fn delete_entry_data(
        &self,
        secret_key: &SecretKey,
        data_key: &str,
        opts: SetJsonOptions,
    ) -> Result<(), SkyDbError> {
        let data_key = parse_data_key(data_key, opts.hashed_data_key_hex)?;
        let request = self.request_options(opts.request);
        let data = Bytes::from_static(&DELETION_ENTRY_DATA);
        self.update_entry(secret_key, &data_key, ready(Ok(((), data))), &request)
            .await
    }

    /// Gets the content the entry points at, without any JSON decoding.
    pub async fn get_raw_bytes(
        &self,
        public_key: &PublicKey,
        data_key: &str,
        opts: GetJsonOptions,
    ) -> Result<SkyDbResponse<Bytes>, SkyDbError> {
        let data_key = parse_data_key(data_key, opts.hashed_data_key_hex)?;
        let request = self.request_options(opts.request);

        let Some(data) = self
            .read_entry_data(public_key, &data_key, false, &request)
            .await?
        else {
            return Ok(SkyDbResponse::Absent);
        };
        let data_link = DataLink::from_bytes(&data).map_err(|err| {
            SkyDbError::Decode(format!(
                "entry {public_key}:{data_key} does not hold a data link: {err}"
            ))
        })?;

        if opts.cached_data_link == Some(data_link) {
            debug!("Entry {public_key}:{data_key} still points at the cached {data_link}");
            return Ok(SkyDbResponse::Unchanged { data_link });
        }

        debug!("Downloading {data_link} for {public_key}:{data_key}");
        let data = self
            .content
            .download(&data_link, &request)
            .await
            .inspect_err(|err| error!("Error downloading {data_link}: {err:?}"))?
            .ok_or_else(|| TransportError::NotFound(data_link.to_string()))?;
        Ok(SkyDbResponse::Found { data, data_link })
    }

    /// Uploads raw content and points the entry at it.
    pub async fn set_raw_bytes(
        &self,
        secret_key: &SecretKey,
        data_key: &str,
        data: Bytes,
        opts: SetJsonOptions,
    ) -> Result<DataLink, SkyDbError> {
        let data_key = parse_data_key(data_key, opts.hashed_data_key_hex)?;
        let request = self.request_options(opts.request);
        self.upload_and_update(secret_key, &data_key, data, RAW_BYTES_MIME_TYPE, &request)
            .await
    }

    /// Fetches the entry and records its revision. Deleted entries read as `None`.
    async fn read_entry_data(
        &self,
        owner: &PublicKey,
        data_key: &DataKey,
        resolve_entry_links: bool,
        request: &RequestOptions,
    ) -> Result<Option<Bytes>, SkyDbError> {
        let cached = self.revision_cache.get_or_create(owner, data_key).await;
        let signed = self
            .fetch_entry(owner, data_key, resolve_entry_links, request)
            .await?;

        // A resolved entry lives at another coordinate, its revision is not ours.
        if !resolve_entry_links {
            cached.observe(signed.as_ref().map(|signed| signed.entry.revision));
        }

        match signed {
            None => Ok(None),
            Some(signed) if signed.entry.is_deleted() => {
                debug!("Entry {owner}:{data_key} is deleted");
                Ok(None)
            }
            Some(signed) => Ok(Some(signed.entry.data)),
        }
    }

    async fn upload_and_update(
        &self,
        secret_key: &SecretKey,
        data_key: &DataKey,
        content: Bytes,
        mime_type: &str,
        request: &RequestOptions,
    ) -> Result<DataLink, SkyDbError> {
        let filename = format!("dk:{}", data_key.to_hex());
        let upload = async move {
            debug!("Uploading {} bytes as {filename}", content.len());
            let link = self
                .content
                .upload(content, &filename, mime_type, request)
                .await
                .inspect_err(|err| error!("Error uploading {filename}: {err:?}"))?;
            let data_link: DataLink = link.parse().map_err(|err| {
                SkyDbError::Transport(TransportError::InvalidResponse(format!(
                    "upload returned an invalid data link {link:?}: {err}"
                )))
            })?;
            Ok::<_, SkyDbError>((data_link, Bytes::copy_from_slice(data_link.as_bytes())))
        };
        self.update_entry(secret_key, data_key, upload, request)
            .await
    }

    /// Writes the data produced by `prepare` at the next revision of the entry.
    ///
    /// When this client does not know the entry's revision yet, the entry is
    /// fetched while `prepare` runs and the fetched revision plus one is proposed.
    /// The revision is then assigned under the entry's lock, and the cache only
    /// moves once the registry accepted the write. A failed write forgets the
    /// cached revision so that the next one starts from the registry again.
    async fn update_entry<T, F>(
        &self,
        secret_key: &SecretKey,
        data_key: &DataKey,
        prepare: F,
        request: &RequestOptions,
    ) -> Result<T, SkyDbError>
    where
        F: Future<Output = Result<(T, Bytes), SkyDbError>>,
    {
        let owner = secret_key.public_key();
        let cached = self.revision_cache.get_or_create(&owner, data_key).await;

        let (output, data, proposed) = if cached.revision().is_some() {
            let (output, data) = prepare.await?;
            (output, data, None)
        } else {
            debug!("Revision of {owner}:{data_key} is unknown, fetching the entry");
            let fetch = async {
                self.fetch_entry(&owner, data_key, false, request)
                    .await
                    .map_err(SkyDbError::from)
            };
            let ((output, data), existing) = try_join(prepare, fetch).await?;
            let proposed = existing.map_or(0, |existing| existing.entry.revision.saturating_add(1));
            (output, data, Some(proposed))
        };

        let guard = cached.lock().await;
        let revision = guard.next_revision(proposed)?;
        let entry = RegistryEntry::new(data_key.clone(), data, revision)
            .map_err(|err| SkyDbError::Validation(err.to_string()))?;
        if let Err(err) = self.post_entry(secret_key, entry, request).await {
            guard.invalidate();
            return Err(err.into());
        }
        guard.commit(revision);

        info!("Updated entry {owner}:{data_key} to revision {revision}");
        #[cfg(feature = "loud")]
        println!("Updated entry {owner}:{data_key} to revision {revision}");
        Ok(output)
    }
}

fn parse_data_key(data_key: &str, hashed_data_key_hex: bool) -> Result<DataKey, SkyDbError> {
    DataKey::new(data_key, hashed_data_key_hex)
        .map_err(|err| SkyDbError::Validation(err.to_string()))
}

/// Parses downloaded JSON, unwrapping the envelope when there is one.
fn parse_json_content(content: &[u8], data_link: &DataLink) -> Result<JsonData, SkyDbError> {
    let value: Value = serde_json::from_slice(content)
        .map_err(|err| SkyDbError::Decode(format!("content at {data_link} is not JSON: {err}")))?;
    let Value::Object(mut object) = value else {
        return Err(SkyDbError::Decode(format!(
            "content at {data_link} is not a JSON object"
        )));
    };

    if !(object.contains_key(ENVELOPE_DATA_FIELD) && object.contains_key(ENVELOPE_VERSION_FIELD)) {
        trace!("Content at {data_link} has no envelope, reading it as legacy JSON");
        return Ok(object);
    }
    match object.remove(ENVELOPE_DATA_FIELD) {
        Some(Value::Object(data)) => Ok(data),
        _ => Err(SkyDbError::Decode(format!(
            "data of the envelope at {data_link} is not a JSON object"
        ))),
    }
}
