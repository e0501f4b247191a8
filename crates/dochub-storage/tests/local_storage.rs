use bytes::Bytes;
use futures::StreamExt;

use dochub_core::ErrorKind;
use dochub_core::traits::storage::StorageProvider;
use dochub_storage::LocalStorageProvider;

async fn storage() -> (tempfile::TempDir, LocalStorageProvider) {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = LocalStorageProvider::new(dir.path().join("blobs"))
        .await
        .expect("storage");
    (dir, storage)
}

#[tokio::test]
async fn test_save_read_delete() {
    let (_dir, storage) = storage().await;
    assert!(storage.health_check().await.expect("health"));

    storage
        .save("7/1700000000_a.txt", Bytes::from_static(b"hello"))
        .await
        .expect("save");
    assert!(storage.exists("7/1700000000_a.txt").await.expect("exists"));
    assert_eq!(
        storage.read_bytes("7/1700000000_a.txt").await.expect("read"),
        Bytes::from_static(b"hello")
    );

    storage.delete("7/1700000000_a.txt").await.expect("delete");
    assert!(!storage.exists("7/1700000000_a.txt").await.expect("exists"));
}

#[tokio::test]
async fn test_open_streams_content() {
    let (_dir, storage) = storage().await;
    let payload = vec![42u8; 20_000];
    storage
        .save("1/0_big.bin", Bytes::from(payload.clone()))
        .await
        .expect("save");

    let mut stream = storage.open("1/0_big.bin").await.expect("open");
    let mut collected = Vec::new();
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk.expect("chunk"));
    }
    assert_eq!(collected, payload);
}

#[tokio::test]
async fn test_missing_blob_is_not_found() {
    let (_dir, storage) = storage().await;
    let err = storage.read_bytes("1/0_missing").await.expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = storage.delete("1/0_missing").await.expect_err("missing");
    assert_eq!(err.kind, ErrorKind::NotFound);
}
