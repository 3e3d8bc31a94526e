// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


//! Files stored under keys derived from a path.
//!
//! Discoverable files live under a key derived from their public path, anyone
//! knowing the owner and the path can find them. Encrypted files live under a
//! key derived from a secret path seed and their content is sealed with a key
//! derived from the same seed.

use super::config::{GetEntryOptions, GetJsonOptions, SetJsonOptions};
use super::db::{SetResponse, SkyDbResponse};
use super::{Client, SkyDbError};
use bytes::Bytes;
use sky_protocol::encryption::{
    decrypt_json_file, derive_encrypted_file_key_entropy, derive_encrypted_file_tweak,
    encrypt_json_file,
};
use sky_protocol::tweak::derive_discoverable_file_tweak;
use sky_protocol::{DataLink, JsonData, PublicKey, SecretKey};

impl Client {
    /// Gets the JSON of the discoverable file at `path`.
    pub async fn file_get_json(
        &self,
        user_id: &PublicKey,
        path: &str,
    ) -> Result<SkyDbResponse<JsonData>, SkyDbError> {
        let tweak = derive_discoverable_file_tweak(path);
        self.get_json(user_id, &tweak, discoverable_get_options())
            .await
    }

    /// Writes the JSON of the discoverable file at `path`.
    pub async fn file_set_json(
        &self,
        secret_key: &SecretKey,
        path: &str,
        json: JsonData,
    ) -> Result<SetResponse<JsonData>, SkyDbError> {
        let tweak = derive_discoverable_file_tweak(path);
        let opts = SetJsonOptions {
            hashed_data_key_hex: true,
            ..Default::default()
        };
        self.set_json(secret_key, &tweak, json, opts).await
    }

    /// Gets the raw entry data of the discoverable file at `path`.
    pub async fn file_get_entry_data(
        &self,
        user_id: &PublicKey,
        path: &str,
    ) -> Result<Option<Bytes>, SkyDbError> {
        let tweak = derive_discoverable_file_tweak(path);
        let opts = GetEntryOptions {
            hashed_data_key_hex: true,
            ..Default::default()
        };
        self.get_entry_data(user_id, &tweak, opts).await
    }

    /// The entry link of the discoverable file at `path`.
    pub fn file_get_entry_link(user_id: &PublicKey, path: &str) -> Result<DataLink, SkyDbError> {
        let tweak = derive_discoverable_file_tweak(path);
        Ok(Client::registry_get_entry_link(user_id, &tweak, true)?)
    }

    /// Gets and decrypts the encrypted file of `path_seed`.
    ///
    /// `None` when there is no such file, nothing is decrypted then.
    pub async fn file_get_json_encrypted(
        &self,
        user_id: &PublicKey,
        path_seed: &str,
    ) -> Result<Option<JsonData>, SkyDbError> {
        let tweak = derive_encrypted_file_tweak(path_seed).map_err(validation)?;
        let key = derive_encrypted_file_key_entropy(path_seed).map_err(validation)?;

        // Without a cached data link the content always comes back.
        let Some(content) = self
            .get_raw_bytes(user_id, &tweak, discoverable_get_options())
            .await?
            .into_data()
        else {
            return Ok(None);
        };

        let json = decrypt_json_file(&content, &key).map_err(|err| match err {
            sky_protocol::Error::DecryptionFailed => {
                warn!("Could not decrypt the encrypted file of {user_id} at {tweak}");
                SkyDbError::Verification(err.to_string())
            }
            err => SkyDbError::Decode(err.to_string()),
        })?;
        Ok(Some(json))
    }

    /// Encrypts the JSON and writes it as the encrypted file of `path_seed`.
    pub async fn file_set_json_encrypted(
        &self,
        secret_key: &SecretKey,
        path_seed: &str,
        json: JsonData,
    ) -> Result<SetResponse<JsonData>, SkyDbError> {
        let tweak = derive_encrypted_file_tweak(path_seed).map_err(validation)?;
        let key = derive_encrypted_file_key_entropy(path_seed).map_err(validation)?;
        let content = encrypt_json_file(&json, &key).map_err(validation)?;

        let opts = SetJsonOptions {
            hashed_data_key_hex: true,
            ..Default::default()
        };
        let data_link = self
            .set_raw_bytes(secret_key, &tweak, Bytes::from(content), opts)
            .await?;
        Ok(SetResponse {
            data: json,
            data_link,
        })
    }
}

fn discoverable_get_options() -> GetJsonOptions {
    GetJsonOptions {
        hashed_data_key_hex: true,
        ..Default::default()
    }
}

fn validation(err: sky_protocol::Error) -> SkyDbError {
    SkyDbError::Validation(err.to_string())
}
