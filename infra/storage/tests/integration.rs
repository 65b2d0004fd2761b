use odk_storage::{
    Compression, FsObjectStore, FsStore, KvStore, MemoryObjectStore, MemoryStore, ObjectStore,
    Records, StorageError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Note {
    id: u64,
    body: String,
}

fn note(id: u64) -> Note {
    Note { id, body: format!("note {id}") }
}

#[tokio::test]
async fn memory_store_hands_out_dense_ids() {
    let store = MemoryStore::new();
    assert_eq!(store.next_id(), 1);
    assert_eq!(store.next_id(), 2);
    assert_eq!(store.next_id(), 3);
}

#[tokio::test]
async fn typed_records_roundtrip() {
    let records: Records<Note> = Records::new(Arc::new(MemoryStore::new()));

    let id = records.next_id();
    records.put(id, &note(id)).await.unwrap();

    assert_eq!(records.get(id).await.unwrap(), Some(note(id)));
    assert_eq!(records.get(999).await.unwrap(), None);
}

#[tokio::test]
async fn listing_preserves_id_order() {
    let records: Records<Note> = Records::new(Arc::new(MemoryStore::new()));

    for _ in 0..3 {
        let id = records.next_id();
        records.put(id, &note(id)).await.unwrap();
    }

    let ids: Vec<u64> = records.list().await.unwrap().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn deleting_a_missing_record_is_an_error() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.delete(42).await,
        Err(StorageError::RecordNotFound { .. })
    ));
}

#[tokio::test]
async fn fs_store_roundtrips_records() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsStore::builder(tmp.path().join("records"))
        .compression(Compression::Lz4)
        .connect()
        .await
        .unwrap();
    let records: Records<Note> = Records::new(Arc::new(store));

    let id = records.next_id();
    records.put(id, &note(id)).await.unwrap();

    assert_eq!(records.get(id).await.unwrap(), Some(note(id)));

    records.delete(id).await.unwrap();
    assert_eq!(records.get(id).await.unwrap(), None);
}

#[tokio::test]
async fn fs_store_recovers_the_id_sequence_after_reconnect() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("records");

    {
        let store = FsStore::builder(&root).connect().await.unwrap();
        for _ in 0..3 {
            let id = store.next_id();
            store.put(id, vec![id as u8]).await.unwrap();
        }
    }

    let store = FsStore::builder(&root).connect().await.unwrap();
    assert_eq!(store.next_id(), 4, "Restart must never reissue an identifier");
}

#[tokio::test]
async fn fs_store_purges_stale_temp_files_on_connect() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("records");
    std::fs::create_dir_all(&root).unwrap();

    let orphan = root.join("00000000000000000001.rec.odktmp.7");
    std::fs::write(&orphan, b"half-written").unwrap();
    let old = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
    let file = std::fs::File::options().write(true).open(&orphan).unwrap();
    file.set_modified(old).unwrap();
    drop(file);

    let _store = FsStore::builder(&root).connect().await.unwrap();
    assert!(!orphan.exists(), "Stale temp file should be cleaned up");
}

#[tokio::test]
async fn memory_objects_roundtrip_and_build_urls() {
    let store = MemoryObjectStore::new("http://localhost:4650/uploads");

    let url = store.put("proofs/a.png", b"png bytes", "image/png").await.unwrap();
    assert_eq!(url, "http://localhost:4650/uploads/proofs/a.png");

    let object = store.get("proofs/a.png").await.unwrap();
    assert_eq!(object.bytes, b"png bytes");
    assert_eq!(object.content_type, "image/png");

    let info = store.head("proofs/a.png").await.unwrap();
    assert_eq!(info.size, 9);

    store.delete("proofs/a.png").await.unwrap();
    assert!(matches!(
        store.get("proofs/a.png").await,
        Err(StorageError::ObjectNotFound { .. })
    ));
}

#[tokio::test]
async fn object_keys_cannot_traverse_the_sandbox() {
    let store = MemoryObjectStore::new("http://localhost:4650/uploads");

    for key in ["../escape.png", "proofs/../../escape.png", "/etc/passwd"] {
        assert!(
            matches!(
                store.put(key, b"x", "image/png").await,
                Err(StorageError::PathTraversalAttempt { .. })
            ),
            "{key} should be rejected"
        );
    }
}

#[tokio::test]
async fn fs_objects_persist_bytes_and_content_type() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsObjectStore::builder(tmp.path().join("objects"))
        .base_url("http://localhost:4650/uploads")
        .connect()
        .await
        .unwrap();

    let url = store.put("proofs/receipt.pdf", b"%PDF-", "application/pdf").await.unwrap();
    assert_eq!(url, "http://localhost:4650/uploads/proofs/receipt.pdf");

    let object = store.get("proofs/receipt.pdf").await.unwrap();
    assert_eq!(object.bytes, b"%PDF-");
    assert_eq!(object.content_type, "application/pdf");

    let info = store.head("proofs/receipt.pdf").await.unwrap();
    assert_eq!(info.size, 5);
    assert_eq!(info.content_type, "application/pdf");

    store.delete("proofs/receipt.pdf").await.unwrap();
    assert!(matches!(
        store.head("proofs/receipt.pdf").await,
        Err(StorageError::ObjectNotFound { .. })
    ));
}

#[tokio::test]
async fn fs_objects_reject_traversal_keys() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FsObjectStore::builder(tmp.path().join("objects"))
        .base_url("http://localhost:4650/uploads")
        .connect()
        .await
        .unwrap();

    assert!(matches!(
        store.put("../../outside.bin", b"x", "application/octet-stream").await,
        Err(StorageError::PathTraversalAttempt { .. })
    ));
}
