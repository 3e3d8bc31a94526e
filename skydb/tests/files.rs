// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


use eyre::Result;
use serde_json::{json, Value};
use sky_logging::LogBuilder;
use skydb::{
    derive_discoverable_file_tweak, derive_encrypted_path_seed, gen_key_pair_from_seed, Bytes,
    Client, GetJsonOptions, JsonData, SkyDbError,
};
use test_utils::MemoryPortal;

fn json_data(value: Value) -> JsonData {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn root_seed() -> String {
    hex::encode([42u8; 64])
}

#[tokio::test]
async fn discoverable_file_round_trip() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("files");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("discoverable")?;
    let path = "app.hns/profile/index.json";

    let written = json_data(json!({ "name": "Ada" }));
    let set = client
        .file_set_json(&keys.secret_key, path, written.clone())
        .await?;

    let got = client.file_get_json(&keys.public_key, path).await?;
    assert_eq!(got.data(), Some(&written));

    // Anyone knowing the path finds the same entry through the tweak.
    let opts = GetJsonOptions {
        hashed_data_key_hex: true,
        ..Default::default()
    };
    let got = client
        .get_json(&keys.public_key, &derive_discoverable_file_tweak(path), opts)
        .await?;
    assert_eq!(got.data_link(), Some(&set.data_link));

    let entry_data = client
        .file_get_entry_data(&keys.public_key, &format!("/{path}/"))
        .await?;
    assert_eq!(entry_data, Some(Bytes::copy_from_slice(set.data_link.as_bytes())));

    let link = Client::file_get_entry_link(&keys.public_key, path)?;
    assert!(link.is_v2());
    assert_eq!(
        link,
        Client::registry_get_entry_link(
            &keys.public_key,
            &derive_discoverable_file_tweak(path),
            true
        )?
    );
    Ok(())
}

#[tokio::test]
async fn encrypted_file_round_trip() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("files");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("encrypted")?;
    let file_seed = derive_encrypted_path_seed(&root_seed(), "notes/today.json", false)?;

    let written = json_data(json!({ "secret": "meet at noon" }));
    client
        .file_set_json_encrypted(&keys.secret_key, &file_seed, written.clone())
        .await?;

    let got = client
        .file_get_json_encrypted(&keys.public_key, &file_seed)
        .await?;
    assert_eq!(got, Some(written.clone()));

    // Reading it again downloads it again.
    let again = client
        .file_get_json_encrypted(&keys.public_key, &file_seed)
        .await?;
    assert_eq!(again, Some(written));
    assert_eq!(portal.downloads(), 2);
    Ok(())
}

#[tokio::test]
async fn encrypted_content_does_not_leak_the_json() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("files");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("sealed")?;
    let file_seed = derive_encrypted_path_seed(&root_seed(), "sealed.json", false)?;

    let set = client
        .file_set_json_encrypted(
            &keys.secret_key,
            &file_seed,
            json_data(json!({ "password": "hunter2" })),
        )
        .await?;

    let raw = client
        .get_raw_bytes(
            &keys.public_key,
            &skydb::derive_encrypted_file_tweak(&file_seed)?,
            GetJsonOptions {
                hashed_data_key_hex: true,
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(raw.data_link(), Some(&set.data_link));
    let raw = raw.into_data().ok_or_else(|| eyre::eyre!("no content"))?;
    assert!(!String::from_utf8_lossy(&raw).contains("hunter2"));
    Ok(())
}

#[tokio::test]
async fn missing_encrypted_file_is_none() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("files");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("missing encrypted")?;
    let file_seed = derive_encrypted_path_seed(&root_seed(), "nothing.json", false)?;

    let got = client
        .file_get_json_encrypted(&keys.public_key, &file_seed)
        .await?;
    assert_eq!(got, None);
    assert_eq!(portal.downloads(), 0);
    Ok(())
}

#[tokio::test]
async fn other_seed_cannot_decrypt() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("files");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("wrong seed")?;
    let file_seed = derive_encrypted_path_seed(&root_seed(), "a.json", false)?;
    let other_seed = derive_encrypted_path_seed(&root_seed(), "b.json", false)?;

    let set = client
        .file_set_json_encrypted(&keys.secret_key, &file_seed, json_data(json!({ "a": 1 })))
        .await?;

    // Point the other file's entry at this content, it cannot be opened with the other key.
    let opts = skydb::SetJsonOptions {
        hashed_data_key_hex: true,
        ..Default::default()
    };
    client
        .set_data_link(
            &keys.secret_key,
            &skydb::derive_encrypted_file_tweak(&other_seed)?,
            &set.data_link,
            opts,
        )
        .await?;

    let result = client
        .file_get_json_encrypted(&keys.public_key, &other_seed)
        .await;
    assert!(matches!(result, Err(SkyDbError::Verification(_))), "{result:?}");
    Ok(())
}

#[tokio::test]
async fn invalid_path_seed_is_a_validation_error() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("files");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("invalid seed")?;

    for seed in ["not hex", "abcd"] {
        let result = client.file_get_json_encrypted(&keys.public_key, seed).await;
        assert!(matches!(result, Err(SkyDbError::Validation(_))), "{result:?}");
    }
    assert_eq!(portal.lookups(), 0);
    Ok(())
}
