use serde_json::json;
use skydb::{gen_key_pair_from_seed, GetJsonOptions, JsonData, SkyDbResponse};
use test_utils::MemoryPortal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    json_document_example().await
}

async fn json_document_example() -> Result<(), Box<dyn std::error::Error>> {
    // An in-memory portal stands in for a real one
    let portal = MemoryPortal::new();
    let client = portal.client();
    let keys = gen_key_pair_from_seed("example seed")?;

    // Write a document
    let mut document = JsonData::new();
    document.insert("message".to_string(), json!("Hello, SkyDB!"));
    let set = client
        .set_json(&keys.secret_key, "example/doc", document.clone(), Default::default())
        .await?;
    println!("Stored at {}", set.data_link);

    // Read it back
    let got = client
        .get_json(&keys.public_key, "example/doc", Default::default())
        .await?;
    assert_eq!(got.data(), Some(&document));
    println!("✓ Read back {:?}", got.data());

    // Nothing is downloaded while the entry still points at what we hold
    let opts = GetJsonOptions {
        cached_data_link: Some(set.data_link),
        ..Default::default()
    };
    let got = client
        .get_json(&keys.public_key, "example/doc", opts)
        .await?;
    assert!(matches!(got, SkyDbResponse::Unchanged { .. }));
    println!("✓ Content unchanged since the last read");

    // Delete it
    client
        .delete_json(&keys.secret_key, "example/doc", Default::default())
        .await?;
    let got = client
        .get_json(&keys.public_key, "example/doc", Default::default())
        .await?;
    assert!(got.is_absent());
    println!("✓ Document deleted");

    Ok(())
}
