// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


use data_encoding::BASE64;
use eyre::Result;
use sky_logging::LogBuilder;
use sky_protocol::registry::encode_entry;
use sky_protocol::{RegistryEntry, SignedRegistryEntry};
use skydb::{
    gen_key_pair_from_seed, Bytes, Client, ClientConfig, DataKey, GetEntryOptions,
    RegistryError, RequestOptions, RetryStrategy, SetJsonOptions, SkyDbError, TransportError,
};
use std::time::Duration;
use test_utils::MemoryPortal;

const RESOLVE: GetEntryOptions = GetEntryOptions {
    hashed_data_key_hex: false,
    resolve_entry_links: true,
    request: None,
};

const NO_RETRY: RequestOptions = RequestOptions {
    timeout: None,
    retry: RetryStrategy::None,
};

/// `owners` entries named "hop 0", "hop 1".., each pointing at the next through
/// its entry link. The last one holds `b"final"`.
async fn link_chain(client: &Client, owners: usize) -> Result<Vec<skydb::KeyPair>> {
    let keys = (0..owners)
        .map(|i| gen_key_pair_from_seed(&format!("chain owner {i}")))
        .collect::<Result<Vec<_>, _>>()?;
    for (i, owner) in keys.iter().enumerate() {
        let data_key = format!("hop {i}");
        let data = match keys.get(i + 1) {
            Some(next) => {
                let link = Client::registry_get_entry_link(
                    &next.public_key,
                    &format!("hop {}", i + 1),
                    false,
                )?;
                link.as_bytes().to_vec()
            }
            None => b"final".to_vec(),
        };
        client
            .set_entry_data(&owner.secret_key, &data_key, &data, Default::default())
            .await?;
    }
    Ok(keys)
}

#[tokio::test]
async fn entry_links_are_resolved_with_a_proof() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = link_chain(&client, 3).await?;

    let resolved = client
        .registry_get_entry(&keys[0].public_key, "hop 0", RESOLVE)
        .await?
        .ok_or_else(|| eyre::eyre!("entry is absent"))?;
    assert_eq!(resolved.entry.data, Bytes::from_static(b"final"));
    assert_eq!(resolved.entry.data_key, DataKey::from("hop 2"));

    let data = client
        .get_entry_data(&keys[0].public_key, "hop 0", RESOLVE)
        .await?;
    assert_eq!(data, Some(Bytes::from_static(b"final")));

    // Without resolution the link itself comes back.
    let link = Client::registry_get_entry_link(&keys[1].public_key, "hop 1", false)?;
    let data = client
        .get_entry_data(&keys[0].public_key, "hop 0", Default::default())
        .await?;
    assert_eq!(data.as_deref(), Some(link.as_bytes().as_slice()));
    Ok(())
}

#[tokio::test]
async fn proof_longer_than_allowed_is_rejected() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let keys = link_chain(&portal.client(), 4).await?;

    let mut config = ClientConfig::default();
    config.set_max_proof_hops(2);
    let client = portal.client_with_config(config);

    let result = client
        .registry_get_entry(&keys[0].public_key, "hop 0", RESOLVE)
        .await;
    assert!(matches!(result, Err(RegistryError::InvalidProof(_))), "{result:?}");

    let result = client
        .get_entry_data(&keys[0].public_key, "hop 0", RESOLVE)
        .await;
    assert!(matches!(result, Err(SkyDbError::Verification(_))), "{result:?}");

    // The two last hops fit.
    let data = client
        .get_entry_data(&keys[1].public_key, "hop 1", RESOLVE)
        .await?;
    assert_eq!(data, Some(Bytes::from_static(b"final")));
    Ok(())
}

#[tokio::test]
async fn tampered_entry_fails_verification() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("tampered")?;

    client
        .set_entry_data(&keys.secret_key, "doc", b"genuine", Default::default())
        .await?;
    assert!(portal.tamper_entry_data(&keys.public_key, &DataKey::from("doc"), b"forged"));

    let result = client
        .get_entry_data(&keys.public_key, "doc", Default::default())
        .await;
    assert!(matches!(result, Err(SkyDbError::Verification(_))), "{result:?}");

    let result = client
        .registry_get_entry(&keys.public_key, "doc", Default::default())
        .await;
    assert!(matches!(result, Err(RegistryError::BadSignature)), "{result:?}");
    Ok(())
}

#[tokio::test]
async fn entry_signed_by_another_key_fails_verification() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let owner = gen_key_pair_from_seed("owner")?;
    let forger = gen_key_pair_from_seed("forger")?;

    let entry = RegistryEntry::new(DataKey::from("doc"), b"forged".to_vec(), 0)?;
    let signed = SignedRegistryEntry::new(entry, &forger.secret_key);
    portal.insert_wire_entry(&owner.public_key, encode_entry(&signed));

    let result = client
        .get_entry_data(&owner.public_key, "doc", Default::default())
        .await;
    assert!(matches!(result, Err(SkyDbError::Verification(_))), "{result:?}");
    Ok(())
}

#[tokio::test]
async fn legacy_base64_entry_data_is_accepted() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("legacy portal")?;

    let entry = RegistryEntry::new(DataKey::from("doc"), b"from an old portal".to_vec(), 4)?;
    let signed = SignedRegistryEntry::new(entry, &keys.secret_key);
    let mut wire = encode_entry(&signed);
    wire.data = BASE64.encode(b"from an old portal");
    portal.insert_wire_entry(&keys.public_key, wire);

    let data = client
        .get_entry_data(&keys.public_key, "doc", Default::default())
        .await?;
    assert_eq!(data, Some(Bytes::from_static(b"from an old portal")));
    assert_eq!(
        client
            .revision_cache()
            .revision(&keys.public_key, &DataKey::from("doc"))
            .await,
        Some(4)
    );

    // The next write goes on top of the legacy revision, encoded as hex.
    client
        .set_entry_data(&keys.secret_key, "doc", b"new", Default::default())
        .await?;
    let stored = portal
        .wire_entry(&keys.public_key, &DataKey::from("doc"))
        .ok_or_else(|| eyre::eyre!("entry is missing"))?;
    assert_eq!(stored.revision, "5");
    assert_eq!(stored.data, hex::encode(b"new"));
    Ok(())
}

#[tokio::test]
async fn registry_set_entry_is_signed_by_the_owner() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("direct")?;

    let entry = RegistryEntry::new(DataKey::from("direct"), b"v0".to_vec(), 0)?;
    client
        .registry_set_entry(&keys.secret_key, entry.clone(), None)
        .await?;

    let got = client
        .registry_get_entry(&keys.public_key, "direct", Default::default())
        .await?
        .ok_or_else(|| eyre::eyre!("entry is absent"))?;
    assert_eq!(got.entry, entry);
    assert!(got.verify(&keys.public_key));

    // Same revision again.
    let result = client
        .registry_set_entry(&keys.secret_key, entry, None)
        .await;
    assert!(matches!(result, Err(RegistryError::UpdateRejected(_))), "{result:?}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_by_the_portal() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("retries")?;

    portal.fail_next_requests(3);
    client
        .set_entry_data(&keys.secret_key, "doc", b"eventually", Default::default())
        .await?;

    portal.fail_next_requests(1);
    let opts = GetEntryOptions {
        request: Some(NO_RETRY),
        ..Default::default()
    };
    let result = client.get_entry_data(&keys.public_key, "doc", opts).await;
    assert!(
        matches!(result, Err(SkyDbError::Transport(TransportError::Network(_)))),
        "{result:?}"
    );

    let data = client.get_entry_data(&keys.public_key, "doc", opts).await?;
    assert_eq!(data, Some(Bytes::from_static(b"eventually")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slow_portal_times_out() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    portal.set_latency(Some(Duration::from_secs(30)));
    let mut config = ClientConfig::default();
    config.set_request_options(RequestOptions {
        timeout: Some(Duration::from_secs(5)),
        retry: RetryStrategy::None,
    });
    let client = portal.client_with_config(config);
    let keys = gen_key_pair_from_seed("slow")?;

    let result = client
        .get_entry_data(&keys.public_key, "doc", Default::default())
        .await;
    assert!(
        matches!(result, Err(SkyDbError::Transport(TransportError::Timeout(_)))),
        "{result:?}"
    );
    Ok(())
}

#[tokio::test]
async fn failed_write_forgets_the_cached_revision() -> Result<()> {
    let _log_guards = LogBuilder::init_single_threaded_tokio_test("registry");

    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("failed write")?;
    let data_key = DataKey::from("doc");

    client
        .set_entry_data(&keys.secret_key, "doc", b"first", Default::default())
        .await?;
    assert_eq!(
        client.revision_cache().revision(&keys.public_key, &data_key).await,
        Some(0)
    );

    // The update is the only request of this write.
    portal.fail_next_requests(1);
    let opts = SetJsonOptions {
        request: Some(NO_RETRY),
        ..Default::default()
    };
    let result = client
        .set_entry_data(&keys.secret_key, "doc", b"second", opts)
        .await;
    assert!(matches!(result, Err(SkyDbError::Transport(_))), "{result:?}");
    assert_eq!(
        client.revision_cache().revision(&keys.public_key, &data_key).await,
        None
    );

    let lookups = portal.lookups();
    client
        .set_entry_data(&keys.secret_key, "doc", b"third", Default::default())
        .await?;
    assert_eq!(portal.lookups(), lookups + 1);
    assert_eq!(
        client.revision_cache().revision(&keys.public_key, &data_key).await,
        Some(1)
    );
    Ok(())
}
